pub mod sdk;

// 重新导出常用类型，方便外部使用
pub use sdk::{
    admin::{AdminApi, ContentModerationScreen, DashboardScreen, ReportsScreen, UserModerationScreen},
    client::SonoraClient,
    config::ClientConfig,
    error::{ApiError, ApiResult},
    friend::{FriendApi, FriendListener, FriendScreen},
    list_store::{ListListener, ListState, ListStore},
    playlist::{PlaylistApi, PlaylistEditor},
    presence::{Heartbeat, HeartbeatHandle, PresenceApi},
    session::{MemoryTokenStore, SessionListener, SqliteTokenStore, TokenStore},
    toast::{Toast, ToastCenter, ToastKind, ToastListener},
};
