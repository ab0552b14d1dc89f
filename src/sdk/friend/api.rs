//! 好友 HTTP API 客户端
//!
//! 负责所有好友申请、好友、黑名单相关的 HTTP 请求

use crate::sdk::error::{ApiError, ApiResult};
use crate::sdk::friend::models::{BlockedUser, Friend, FriendRequest, Relationship};
use crate::sdk::friend::types::{
    BlockUserReq, BlockedUsersResp, FriendRequestsResp, FriendsResp, RelationshipResp,
};
use crate::sdk::http::{ApiClient, NO_QUERY};
use crate::sdk::types::ServerMessage;
use tracing::info;

/// 好友相关的 HTTP API 客户端
#[derive(Clone)]
pub struct FriendApi {
    http: ApiClient,
}

impl FriendApi {
    pub fn new(http: ApiClient) -> Self {
        Self { http }
    }

    /// 收到的待处理好友申请
    pub async fn get_pending_requests(&self) -> ApiResult<Vec<FriendRequest>> {
        info!("[FriendAPI] 📡 请求待处理好友申请");
        let resp: FriendRequestsResp = self
            .http
            .get_json("/amistad/solicitudes", NO_QUERY, "好友申请列表")
            .await?;
        Ok(resp.requests)
    }

    /// 已发出的好友申请
    pub async fn get_sent_requests(&self) -> ApiResult<Vec<FriendRequest>> {
        info!("[FriendAPI] 📡 请求已发送的好友申请");
        let resp: FriendRequestsResp = self
            .http
            .get_json("/amistad/solicitudes/enviadas", NO_QUERY, "已发送申请列表")
            .await?;
        Ok(resp.requests)
    }

    pub async fn send_request(&self, user_id: &str) -> ApiResult<ServerMessage> {
        require_id(user_id)?;
        info!("[FriendAPI] 发送好友申请 -> {}", user_id);
        self.message(
            self.http
                .post_empty(&format!("/amistad/solicitud/{user_id}"), "发送好友申请")
                .await?,
        )
    }

    pub async fn accept_request(&self, request_id: &str) -> ApiResult<ServerMessage> {
        require_id(request_id)?;
        info!("[FriendAPI] 接受好友申请 {}", request_id);
        self.message(
            self.http
                .post_empty(&format!("/amistad/aceptar/{request_id}"), "接受好友申请")
                .await?,
        )
    }

    pub async fn reject_request(&self, request_id: &str) -> ApiResult<ServerMessage> {
        require_id(request_id)?;
        info!("[FriendAPI] 拒绝好友申请 {}", request_id);
        self.message(
            self.http
                .post_empty(&format!("/amistad/rechazar/{request_id}"), "拒绝好友申请")
                .await?,
        )
    }

    /// 好友列表（包含在线状态）
    pub async fn get_friends(&self) -> ApiResult<Vec<Friend>> {
        info!("[FriendAPI] 📡 请求好友列表");
        let resp: FriendsResp = self
            .http
            .get_json("/amistad/amigos", NO_QUERY, "好友列表")
            .await?;
        Ok(resp.friends)
    }

    /// 删除好友
    pub async fn remove_friend(&self, user_id: &str) -> ApiResult<ServerMessage> {
        require_id(user_id)?;
        info!("[FriendAPI] 删除好友 {}", user_id);
        self.message(
            self.http
                .delete(&format!("/amistad/amigos/{user_id}"), "删除好友")
                .await?,
        )
    }

    pub async fn get_relationship(&self, user_id: &str) -> ApiResult<Relationship> {
        require_id(user_id)?;
        let resp: RelationshipResp = self
            .http
            .get_json(&format!("/amistad/estado/{user_id}"), NO_QUERY, "好友关系")
            .await?;
        Ok(resp.relationship)
    }

    /// 黑名单
    pub async fn get_blocked_users(&self) -> ApiResult<Vec<BlockedUser>> {
        info!("[FriendAPI] 📡 请求黑名单");
        let resp: BlockedUsersResp = self
            .http
            .get_json("/bloqueos", NO_QUERY, "黑名单")
            .await?;
        Ok(resp.blocked)
    }

    /// 屏蔽用户，`reason` 为空时不发送该字段
    pub async fn block_user(&self, user_id: &str, reason: Option<&str>) -> ApiResult<ServerMessage> {
        require_id(user_id)?;
        info!("[FriendAPI] 🚫 屏蔽用户 {}", user_id);
        let body = BlockUserReq {
            reason: reason.map(str::trim).filter(|r| !r.is_empty()),
        };
        self.message(
            self.http
                .post_json(&format!("/bloqueos/{user_id}"), &body, "屏蔽用户")
                .await?,
        )
    }

    pub async fn unblock_user(&self, user_id: &str) -> ApiResult<ServerMessage> {
        require_id(user_id)?;
        info!("[FriendAPI] 解除屏蔽 {}", user_id);
        self.message(
            self.http
                .delete(&format!("/bloqueos/{user_id}"), "解除屏蔽")
                .await?,
        )
    }

    fn message(&self, resp: Option<ServerMessage>) -> ApiResult<ServerMessage> {
        Ok(resp.unwrap_or_default())
    }
}

fn require_id(id: &str) -> ApiResult<()> {
    if id.trim().is_empty() {
        return Err(ApiError::Validation("Identificador vacío".into()));
    }
    Ok(())
}
