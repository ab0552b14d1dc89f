//! 管理后台 HTTP API 客户端
//!
//! 统计、举报处理、用户处罚、内容删除

use crate::sdk::admin::models::{
    AdminUser, BehaviorEntry, ContentItem, ContentKind, DashboardStats, ReportAction,
    ReportStatus,
};
use crate::sdk::admin::types::{
    ContentQuery, ContentResp, DeleteContentReq, HistoryResp, ReportFilter, ReportStatusReq,
    ReportsResp, ResolveReportReq, SuspendUserReq, UsersResp,
};
use crate::sdk::error::{ApiError, ApiResult};
use crate::sdk::http::{ApiClient, NO_QUERY};
use crate::sdk::types::ServerMessage;
use tracing::{debug, info};

/// 管理后台 HTTP API 客户端
#[derive(Clone)]
pub struct AdminApi {
    http: ApiClient,
}

impl AdminApi {
    pub fn new(http: ApiClient) -> Self {
        Self { http }
    }

    pub async fn get_dashboard(&self) -> ApiResult<DashboardStats> {
        info!("[AdminAPI] 📡 请求后台统计");
        let stats: Option<DashboardStats> = self
            .http
            .get_json("/admin/dashboard", NO_QUERY, "后台统计")
            .await?;
        Ok(stats.unwrap_or_default())
    }

    // ========== 举报 ==========

    pub async fn get_reports(&self, filter: &ReportFilter) -> ApiResult<ReportsResp> {
        let query = filter.to_query();
        debug!("[AdminAPI] 举报过滤条件: {:?}", query);
        self.http
            .get_json("/admin/reportes", &query, "举报列表")
            .await
    }

    pub async fn resolve_report(
        &self,
        report_id: &str,
        action: ReportAction,
        notes: Option<&str>,
    ) -> ApiResult<ServerMessage> {
        require(report_id, "Identificador de reporte vacío")?;
        info!("[AdminAPI] 处理举报 {} -> {:?}", report_id, action);
        let body = ResolveReportReq {
            action,
            notes: notes.map(str::trim).filter(|n| !n.is_empty()),
        };
        let resp: Option<ServerMessage> = self
            .http
            .put_json(&format!("/admin/reportes/{report_id}/resolver"), &body, "处理举报")
            .await?;
        Ok(resp.unwrap_or_default())
    }

    pub async fn update_report_status(
        &self,
        report_id: &str,
        status: ReportStatus,
    ) -> ApiResult<ServerMessage> {
        require(report_id, "Identificador de reporte vacío")?;
        info!("[AdminAPI] 更新举报状态 {} -> {}", report_id, status);
        let resp: Option<ServerMessage> = self
            .http
            .put_json(
                &format!("/admin/reportes/{report_id}/estado"),
                &ReportStatusReq { status },
                "更新举报状态",
            )
            .await?;
        Ok(resp.unwrap_or_default())
    }

    // ========== 用户 ==========

    pub async fn search_users(&self, query: &str) -> ApiResult<Vec<AdminUser>> {
        let resp: UsersResp = self
            .http
            .get_json("/admin/usuarios/buscar", &[("q", query.trim())], "搜索用户")
            .await?;
        Ok(resp.users)
    }

    /// 暂停用户，请求体为 `{motivo, duracionDias}`
    pub async fn suspend_user(
        &self,
        user_id: &str,
        reason: &str,
        days: u32,
    ) -> ApiResult<ServerMessage> {
        require(user_id, "Identificador de usuario vacío")?;
        let reason = require(reason, "El motivo de la suspensión es obligatorio")?;
        if days == 0 {
            return Err(ApiError::Validation(
                "La duración debe ser de al menos un día".into(),
            ));
        }
        info!("[AdminAPI] ⛔ 暂停用户 {}，{} 天", user_id, days);
        let body = SuspendUserReq {
            motivo: reason,
            duracion_dias: days,
        };
        let resp: Option<ServerMessage> = self
            .http
            .put_json(&format!("/admin/usuarios/{user_id}/suspender"), &body, "暂停用户")
            .await?;
        Ok(resp.unwrap_or_default())
    }

    pub async fn lift_suspension(&self, user_id: &str) -> ApiResult<ServerMessage> {
        require(user_id, "Identificador de usuario vacío")?;
        info!("[AdminAPI] 解除暂停 {}", user_id);
        let resp: Option<ServerMessage> = self
            .http
            .put_json(
                &format!("/admin/usuarios/{user_id}/levantar-suspension"),
                &serde_json::json!({}),
                "解除暂停",
            )
            .await?;
        Ok(resp.unwrap_or_default())
    }

    pub async fn get_user_history(&self, user_id: &str) -> ApiResult<Vec<BehaviorEntry>> {
        require(user_id, "Identificador de usuario vacío")?;
        let resp: HistoryResp = self
            .http
            .get_json(
                &format!("/admin/usuarios/{user_id}/historial"),
                NO_QUERY,
                "用户行为历史",
            )
            .await?;
        Ok(resp.entries)
    }

    // ========== 内容 ==========

    pub async fn search_content(&self, query: &ContentQuery) -> ApiResult<Vec<ContentItem>> {
        let resp: ContentResp = self
            .http
            .get_json("/admin/contenido/buscar", &query.to_query(), "搜索内容")
            .await?;
        Ok(resp.items)
    }

    /// 删除内容；原因为空时直接拒绝，不发请求
    pub async fn delete_content(
        &self,
        kind: ContentKind,
        content_id: &str,
        reason: &str,
    ) -> ApiResult<ServerMessage> {
        require(content_id, "Identificador de contenido vacío")?;
        let reason = require(reason, DELETE_REASON_REQUIRED)?;
        info!("[AdminAPI] 🗑️ 删除内容 {}/{}", kind.as_str(), content_id);
        let resp: Option<ServerMessage> = self
            .http
            .delete_json(
                &format!("/admin/contenido/{}/{content_id}", kind.as_str()),
                &DeleteContentReq { motivo: reason },
                "删除内容",
            )
            .await?;
        Ok(resp.unwrap_or_default())
    }
}

pub(crate) const DELETE_REASON_REQUIRED: &str = "Debes indicar el motivo de la eliminación";

/// 必填字段校验，返回去掉首尾空白后的值
pub(crate) fn require<'a>(value: &'a str, message: &str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(message.to_string()));
    }
    Ok(trimmed)
}
