//! 后台统计与举报界面的状态层
//!
//! 举报由服务端维护状态机，客户端在任何修改操作之后重新拉取整张列表。

use crate::sdk::admin::api::AdminApi;
use crate::sdk::admin::models::{DashboardStats, Report, ReportAction, ReportStatus};
use crate::sdk::admin::types::ReportFilter;
use crate::sdk::error::ApiResult;
use crate::sdk::list_store::{ListStore, Reconcile};
use crate::sdk::toast::ToastCenter;
use std::sync::Mutex;
use tracing::{debug, info};

/// 后台统计状态
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub stats: Option<DashboardStats>,
    pub loading: bool,
}

/// 后台首页
pub struct DashboardScreen {
    api: AdminApi,
    toasts: ToastCenter,
    state: Mutex<DashboardState>,
}

impl DashboardScreen {
    pub fn new(api: AdminApi, toasts: ToastCenter) -> Self {
        Self {
            api,
            toasts,
            state: Mutex::new(DashboardState::default()),
        }
    }

    pub fn state(&self) -> DashboardState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// 拉取统计；失败时保留上一次的数据
    pub async fn refresh(&self) -> ApiResult<()> {
        self.update(|s| s.loading = true);
        let res = self.api.get_dashboard().await;
        let outcome = match res {
            Ok(stats) => {
                info!(
                    "[Dashboard] 用户 {}，待处理举报 {}",
                    stats.total_usuarios, stats.reportes_pendientes
                );
                self.update(|s| s.stats = Some(stats));
                Ok(())
            }
            Err(e) => {
                self.toasts.report("Dashboard", &e).await;
                Err(e)
            }
        };
        self.update(|s| s.loading = false);
        outcome
    }

    fn update(&self, f: impl FnOnce(&mut DashboardState)) {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
    }
}

/// 举报列表界面
pub struct ReportsScreen {
    api: AdminApi,
    toasts: ToastCenter,
    filter: Mutex<ReportFilter>,
    total: Mutex<Option<u64>>,
    reports: ListStore<Report>,
}

impl ReportsScreen {
    pub fn new(api: AdminApi, toasts: ToastCenter) -> Self {
        Self {
            api,
            toasts,
            filter: Mutex::new(ReportFilter::pending()),
            total: Mutex::new(None),
            reports: ListStore::new("Reports"),
        }
    }

    pub fn reports(&self) -> &ListStore<Report> {
        &self.reports
    }

    pub fn filter(&self) -> ReportFilter {
        self.filter.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// 服务端返回的总数（分页用）
    pub fn total(&self) -> Option<u64> {
        self.total.lock().ok().and_then(|t| *t)
    }

    /// 修改过滤条件并重新拉取
    pub async fn set_filter(&self, filter: ReportFilter) -> ApiResult<()> {
        if let Ok(mut current) = self.filter.lock() {
            *current = filter;
        }
        self.load().await
    }

    pub async fn load(&self) -> ApiResult<()> {
        let filter = self.filter();
        let res = self
            .reports
            .refresh_with(async {
                let resp = self.api.get_reports(&filter).await?;
                Ok((resp.reports, resp.total))
            })
            .await;
        match res {
            // 过期的拉取返回 None，总数保持为采用的那次结果
            Ok(Some(total)) => {
                if let Ok(mut current) = self.total.lock() {
                    *current = total;
                }
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                self.toasts.report("Reports", &e).await;
                Err(e)
            }
        }
    }

    /// 修改成功之后重新拉取；拉取失败已经弹过 toast，不影响修改本身的结果
    async fn reload_after_change(&self) {
        if let Err(e) = self.load().await {
            debug!("[Reports] 修改后重新拉取失败: {}", e);
        }
    }

    /// 处理举报，成功后重新拉取整张列表
    pub async fn resolve(
        &self,
        report_id: &str,
        action: ReportAction,
        notes: Option<&str>,
    ) -> ApiResult<()> {
        let res = self
            .reports
            .act_with(
                report_id,
                Reconcile::Keep,
                self.api.resolve_report(report_id, action, notes),
            )
            .await;
        match res {
            Ok(msg) => {
                self.toasts.success(msg.text_or("Reporte resuelto")).await;
                self.reload_after_change().await;
                Ok(())
            }
            Err(e) => {
                self.toasts.report("Reports", &e).await;
                Err(e)
            }
        }
    }

    /// 修改举报状态，成功后重新拉取整张列表
    pub async fn change_status(&self, report_id: &str, status: ReportStatus) -> ApiResult<()> {
        let res = self
            .reports
            .act_with(
                report_id,
                Reconcile::Keep,
                self.api.update_report_status(report_id, status),
            )
            .await;
        match res {
            Ok(msg) => {
                self.toasts
                    .success(msg.text_or("Estado del reporte actualizado"))
                    .await;
                self.reload_after_change().await;
                Ok(())
            }
            Err(e) => {
                self.toasts.report("Reports", &e).await;
                Err(e)
            }
        }
    }

    pub fn close(&self) {
        self.reports.close();
    }
}
