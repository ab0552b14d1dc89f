//! 好友模块：好友申请、好友列表、黑名单

pub mod api;
pub mod listener;
pub mod models;
pub mod service;
pub mod types;

// 重新导出主要类型
pub use api::FriendApi;
pub use listener::{EmptyFriendListener, FriendListener};
pub use models::{BlockedUser, Friend, FriendRequest, Relationship, RequestStatus, UserSummary};
pub use service::FriendScreen;
