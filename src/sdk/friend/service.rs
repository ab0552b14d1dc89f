//! 好友管理界面的状态层
//!
//! 三个标签页（待处理申请、好友、黑名单）共用同一套 [`ListStore`] 逻辑：
//! 切换标签时拉取，操作成功后只从对应列表移除条目，失败时弹出错误 toast。

use crate::sdk::error::{ApiError, ApiResult};
use crate::sdk::friend::api::FriendApi;
use crate::sdk::friend::listener::{EmptyFriendListener, FriendListener};
use crate::sdk::friend::models::{BlockedUser, Friend, FriendRequest};
use crate::sdk::list_store::ListStore;
use crate::sdk::toast::ToastCenter;
use crate::sdk::types::ServerMessage;
use std::sync::Arc;
use tracing::info;

/// 好友管理界面
pub struct FriendScreen {
    api: FriendApi,
    toasts: ToastCenter,
    listener: Arc<dyn FriendListener>,
    requests: ListStore<FriendRequest>,
    friends: ListStore<Friend>,
    blocked: ListStore<BlockedUser>,
}

impl FriendScreen {
    pub fn new(api: FriendApi, toasts: ToastCenter) -> Self {
        Self::with_listener(api, toasts, Arc::new(EmptyFriendListener))
    }

    pub fn with_listener(
        api: FriendApi,
        toasts: ToastCenter,
        listener: Arc<dyn FriendListener>,
    ) -> Self {
        Self {
            api,
            toasts,
            listener,
            requests: ListStore::new("FriendRequests"),
            friends: ListStore::new("Friends"),
            blocked: ListStore::new("BlockedUsers"),
        }
    }

    pub fn requests(&self) -> &ListStore<FriendRequest> {
        &self.requests
    }

    pub fn friends(&self) -> &ListStore<Friend> {
        &self.friends
    }

    pub fn blocked(&self) -> &ListStore<BlockedUser> {
        &self.blocked
    }

    // ========== 拉取 ==========

    pub async fn load_requests(&self) -> ApiResult<()> {
        let res = self.requests.refresh(self.api.get_pending_requests()).await;
        self.report_failure(&res).await;
        if res.is_ok() {
            self.notify_requests().await;
        }
        res
    }

    pub async fn load_friends(&self) -> ApiResult<()> {
        let res = self.friends.refresh(self.api.get_friends()).await;
        self.report_failure(&res).await;
        if res.is_ok() {
            self.notify_friends().await;
        }
        res
    }

    pub async fn load_blocked(&self) -> ApiResult<()> {
        let res = self.blocked.refresh(self.api.get_blocked_users()).await;
        self.report_failure(&res).await;
        if res.is_ok() {
            self.notify_blocked().await;
        }
        res
    }

    // ========== 好友申请 ==========

    pub async fn accept_request(&self, request_id: &str) -> ApiResult<()> {
        let res = self
            .requests
            .act(request_id, self.api.accept_request(request_id))
            .await;
        self.finish(res, "Solicitud aceptada").await?;
        self.notify_requests().await;
        Ok(())
    }

    pub async fn reject_request(&self, request_id: &str) -> ApiResult<()> {
        let res = self
            .requests
            .act(request_id, self.api.reject_request(request_id))
            .await;
        self.finish(res, "Solicitud rechazada").await?;
        self.notify_requests().await;
        Ok(())
    }

    /// 屏蔽申请人：只从待处理列表中移除该申请
    pub async fn block_from_request(&self, request_id: &str, reason: Option<&str>) -> ApiResult<()> {
        let requester = self
            .requests
            .items()
            .into_iter()
            .find(|r| r.id == request_id)
            .map(|r| r.requester.id)
            .ok_or_else(|| ApiError::Validation("Solicitud no encontrada".into()))?;

        let res = self
            .requests
            .act(request_id, self.api.block_user(&requester, reason))
            .await;
        self.finish(res, "Usuario bloqueado").await?;
        self.notify_requests().await;
        Ok(())
    }

    pub async fn send_request(&self, user_id: &str) -> ApiResult<()> {
        let res = self.api.send_request(user_id).await;
        self.finish(res, "Solicitud enviada").await
    }

    // ========== 好友 / 黑名单 ==========

    pub async fn remove_friend(&self, user_id: &str) -> ApiResult<()> {
        let res = self
            .friends
            .act(user_id, self.api.remove_friend(user_id))
            .await;
        self.finish(res, "Amigo eliminado").await?;
        self.notify_friends().await;
        Ok(())
    }

    pub async fn unblock_user(&self, user_id: &str) -> ApiResult<()> {
        let res = self
            .blocked
            .act(user_id, self.api.unblock_user(user_id))
            .await;
        self.finish(res, "Usuario desbloqueado").await?;
        self.notify_blocked().await;
        Ok(())
    }

    /// 界面销毁：取消所有进行中的请求
    pub fn close(&self) {
        self.requests.close();
        self.friends.close();
        self.blocked.close();
    }

    /// 成功时弹出成功 toast（服务端文案优先），失败时弹出错误 toast
    async fn finish(&self, res: ApiResult<ServerMessage>, ok_text: &str) -> ApiResult<()> {
        match res {
            Ok(msg) => {
                info!("[FriendScreen] ✅ {}", ok_text);
                self.toasts.success(msg.text_or(ok_text)).await;
                Ok(())
            }
            Err(e) => {
                self.toasts.report("FriendScreen", &e).await;
                Err(e)
            }
        }
    }

    async fn report_failure<T>(&self, res: &ApiResult<T>) {
        if let Err(e) = res {
            self.toasts.report("FriendScreen", e).await;
        }
    }

    async fn notify_requests(&self) {
        if let Ok(json) = serde_json::to_string(&self.requests.items()) {
            self.listener.on_friend_request_list_changed(json).await;
        }
    }

    async fn notify_friends(&self) {
        if let Ok(json) = serde_json::to_string(&self.friends.items()) {
            self.listener.on_friend_list_changed(json).await;
        }
    }

    async fn notify_blocked(&self) {
        if let Ok(json) = serde_json::to_string(&self.blocked.items()) {
            self.listener.on_black_list_changed(json).await;
        }
    }
}
