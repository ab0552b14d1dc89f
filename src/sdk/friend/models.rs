//! 好友相关的本地模型（服务端数据的临时镜像，不作为权威数据）

use crate::sdk::list_store::Keyed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户摘要信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserSummary {
    /// 优先显示昵称
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// 好友申请状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[serde(alias = "pendiente")]
    Pending,
    #[serde(alias = "aceptada")]
    Accepted,
    #[serde(alias = "rechazada")]
    Rejected,
    #[serde(alias = "bloqueada")]
    Blocked,
}

/// 好友申请
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: String,
    #[serde(alias = "solicitante")]
    pub requester: UserSummary,
    #[serde(alias = "destinatario")]
    pub recipient: UserSummary,
    #[serde(alias = "estado")]
    pub status: RequestStatus,
    #[serde(alias = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
}

impl Keyed for FriendRequest {
    fn key(&self) -> &str {
        &self.id
    }
}

/// 好友（带在线状态字段）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    #[serde(flatten)]
    pub user: UserSummary,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub last_connection: Option<DateTime<Utc>>,
}

impl Keyed for Friend {
    fn key(&self) -> &str {
        &self.user.id
    }
}

/// 已屏蔽用户
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockedUser {
    #[serde(alias = "usuario")]
    pub user: UserSummary,
    #[serde(default, alias = "motivo")]
    pub reason: Option<String>,
    #[serde(alias = "fechaBloqueo")]
    pub blocked_at: DateTime<Utc>,
}

impl Keyed for BlockedUser {
    fn key(&self) -> &str {
        &self.user.id
    }
}

/// 与某个用户的关系
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    None,
    Friends,
    RequestSent,
    RequestReceived,
    Blocked,
    BlockedBy,
}
