//! 好友 API DTO（请求和响应结构体）

use crate::sdk::friend::models::{BlockedUser, Friend, FriendRequest, Relationship};
use crate::sdk::types::deserialize_vec_or_null;
use serde::{Deserialize, Serialize};

/// 好友申请列表响应
#[derive(Debug, Clone, Deserialize)]
pub struct FriendRequestsResp {
    #[serde(rename = "solicitudes", default, deserialize_with = "deserialize_vec_or_null")]
    pub requests: Vec<FriendRequest>,
}

/// 好友列表响应
#[derive(Debug, Clone, Deserialize)]
pub struct FriendsResp {
    #[serde(rename = "amigos", default, deserialize_with = "deserialize_vec_or_null")]
    pub friends: Vec<Friend>,
}

/// 黑名单响应
#[derive(Debug, Clone, Deserialize)]
pub struct BlockedUsersResp {
    #[serde(rename = "bloqueados", default, deserialize_with = "deserialize_vec_or_null")]
    pub blocked: Vec<BlockedUser>,
}

/// 屏蔽用户请求
#[derive(Debug, Clone, Serialize)]
pub struct BlockUserReq<'a> {
    #[serde(rename = "motivo", skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
}

/// 关系状态响应
#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipResp {
    #[serde(rename = "estado")]
    pub relationship: Relationship,
}
