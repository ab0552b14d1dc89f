//! 好友监听器回调接口

use async_trait::async_trait;

/// 好友监听器回调接口，参数均为变更后完整列表的 JSON 数组字符串
#[async_trait]
pub trait FriendListener: Send + Sync {
    /// 好友列表发生变更
    async fn on_friend_list_changed(&self, friends_json: String);

    /// 黑名单发生变更
    async fn on_black_list_changed(&self, blocked_json: String);

    /// 待处理好友申请列表发生变更
    async fn on_friend_request_list_changed(&self, requests_json: String);
}

/// 默认空实现（无操作）
pub struct EmptyFriendListener;

#[async_trait]
impl FriendListener for EmptyFriendListener {
    async fn on_friend_list_changed(&self, _friends_json: String) {}

    async fn on_black_list_changed(&self, _blocked_json: String) {}

    async fn on_friend_request_list_changed(&self, _requests_json: String) {}
}
