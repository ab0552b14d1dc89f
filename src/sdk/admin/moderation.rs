//! 用户处罚与内容审核界面

use crate::sdk::admin::api::{require, AdminApi, DELETE_REASON_REQUIRED};
use crate::sdk::admin::models::{AdminUser, BehaviorEntry, ContentItem};
use crate::sdk::admin::types::ContentQuery;
use crate::sdk::error::{ApiError, ApiResult};
use crate::sdk::list_store::{ListStore, Reconcile};
use crate::sdk::toast::ToastCenter;
use std::sync::Mutex;
use tracing::{debug, info};

/// 用户处罚界面：搜索、暂停、解除暂停、行为历史
pub struct UserModerationScreen {
    api: AdminApi,
    toasts: ToastCenter,
    query: Mutex<String>,
    users: ListStore<AdminUser>,
    history: Mutex<Option<(String, Vec<BehaviorEntry>)>>,
}

impl UserModerationScreen {
    pub fn new(api: AdminApi, toasts: ToastCenter) -> Self {
        Self {
            api,
            toasts,
            query: Mutex::new(String::new()),
            users: ListStore::new("AdminUsers"),
            history: Mutex::new(None),
        }
    }

    pub fn users(&self) -> &ListStore<AdminUser> {
        &self.users
    }

    /// 当前展示的行为历史：(用户 ID, 记录)
    pub fn history(&self) -> Option<(String, Vec<BehaviorEntry>)> {
        self.history.lock().ok().and_then(|h| h.clone())
    }

    pub async fn search(&self, query: &str) -> ApiResult<()> {
        if let Ok(mut current) = self.query.lock() {
            *current = query.to_string();
        }
        self.reload().await
    }

    /// 修改成功之后重新拉取；拉取失败已经弹过 toast，不影响修改本身的结果
    async fn reload_after_change(&self) {
        if let Err(e) = self.reload().await {
            debug!("[UserModeration] 修改后重新拉取失败: {}", e);
        }
    }

    /// 用上一次的搜索条件重新拉取
    pub async fn reload(&self) -> ApiResult<()> {
        let query = self.query.lock().map(|q| q.clone()).unwrap_or_default();
        let res = self.users.refresh(self.api.search_users(&query)).await;
        if let Err(e) = &res {
            self.toasts.report("UserModeration", e).await;
        }
        res
    }

    /// 暂停用户，成功后重新拉取搜索结果以刷新状态标记
    pub async fn suspend(&self, user_id: &str, days: u32, reason: &str) -> ApiResult<()> {
        let res = self
            .users
            .act_with(
                user_id,
                Reconcile::Keep,
                self.api.suspend_user(user_id, reason, days),
            )
            .await;
        match res {
            Ok(msg) => {
                info!("[UserModeration] 用户 {} 已暂停 {} 天", user_id, days);
                self.toasts
                    .success(msg.text_or("Usuario suspendido correctamente"))
                    .await;
                self.reload_after_change().await;
                Ok(())
            }
            Err(e) => {
                self.toasts.report("UserModeration", &e).await;
                Err(e)
            }
        }
    }

    pub async fn lift_suspension(&self, user_id: &str) -> ApiResult<()> {
        let res = self
            .users
            .act_with(user_id, Reconcile::Keep, self.api.lift_suspension(user_id))
            .await;
        match res {
            Ok(msg) => {
                self.toasts
                    .success(msg.text_or("Suspensión levantada"))
                    .await;
                self.reload_after_change().await;
                Ok(())
            }
            Err(e) => {
                self.toasts.report("UserModeration", &e).await;
                Err(e)
            }
        }
    }

    pub async fn load_history(&self, user_id: &str) -> ApiResult<()> {
        match self.api.get_user_history(user_id).await {
            Ok(entries) => {
                debug!("[UserModeration] 用户 {} 历史记录 {} 条", user_id, entries.len());
                if let Ok(mut history) = self.history.lock() {
                    *history = Some((user_id.to_string(), entries));
                }
                Ok(())
            }
            Err(e) => {
                self.toasts.report("UserModeration", &e).await;
                Err(e)
            }
        }
    }

    pub fn close(&self) {
        self.users.close();
    }
}

/// 内容审核界面：搜索内容并附带原因删除
pub struct ContentModerationScreen {
    api: AdminApi,
    toasts: ToastCenter,
    query: Mutex<ContentQuery>,
    results: ListStore<ContentItem>,
}

impl ContentModerationScreen {
    pub fn new(api: AdminApi, toasts: ToastCenter) -> Self {
        Self {
            api,
            toasts,
            query: Mutex::new(ContentQuery::default()),
            results: ListStore::new("ContentResults"),
        }
    }

    pub fn results(&self) -> &ListStore<ContentItem> {
        &self.results
    }

    pub fn query(&self) -> ContentQuery {
        self.query.lock().map(|q| q.clone()).unwrap_or_default()
    }

    pub async fn search(&self, query: ContentQuery) -> ApiResult<()> {
        if let Ok(mut current) = self.query.lock() {
            *current = query.clone();
        }
        let res = self.results.refresh(self.api.search_content(&query)).await;
        if let Err(e) = &res {
            self.toasts.report("ContentModeration", e).await;
        }
        res
    }

    /// 删除内容：原因为空或内容不在当前结果中时在客户端拒绝；成功后从结果中移除
    pub async fn delete(&self, content_id: &str, reason: &str) -> ApiResult<()> {
        let item = match self.deletable(content_id, reason) {
            Ok(item) => item,
            Err(e) => {
                self.toasts.report("ContentModeration", &e).await;
                return Err(e);
            }
        };

        let res = self
            .results
            .act(content_id, self.api.delete_content(item.tipo, content_id, reason))
            .await;
        match res {
            Ok(msg) => {
                info!("[ContentModeration] 已删除 {} ({})", item.titulo, content_id);
                self.toasts
                    .success(msg.text_or("Contenido eliminado"))
                    .await;
                Ok(())
            }
            Err(e) => {
                self.toasts.report("ContentModeration", &e).await;
                Err(e)
            }
        }
    }

    fn deletable(&self, content_id: &str, reason: &str) -> ApiResult<ContentItem> {
        require(reason, DELETE_REASON_REQUIRED)?;
        self.results
            .items()
            .into_iter()
            .find(|c| c.id == content_id)
            .ok_or_else(|| {
                debug!("[ContentModeration] 内容 {} 不在当前结果中", content_id);
                ApiError::Validation("Contenido no encontrado".into())
            })
    }

    pub fn close(&self) {
        self.results.close();
    }
}
