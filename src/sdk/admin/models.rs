//! 管理后台模型

use crate::sdk::friend::models::UserSummary;
use crate::sdk::list_store::Keyed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 后台首页统计
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_usuarios: u64,
    pub usuarios_activos: u64,
    pub usuarios_suspendidos: u64,
    pub total_canciones: u64,
    pub total_playlists: u64,
    pub reportes_pendientes: u64,
    pub reportes_urgentes: u64,
    pub contenido_eliminado: u64,
}

/// 举报状态：pendiente → en_revision → resuelto
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReportStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "en_revision")]
    InReview,
    #[serde(rename = "resuelto")]
    Resolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pendiente",
            ReportStatus::InReview => "en_revision",
            ReportStatus::Resolved => "resuelto",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportPriority {
    #[serde(rename = "baja")]
    Low,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
    #[serde(rename = "urgente")]
    Urgent,
}

impl ReportPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPriority::Low => "baja",
            ReportPriority::Medium => "media",
            ReportPriority::High => "alta",
            ReportPriority::Urgent => "urgente",
        }
    }
}

/// 处理举报时可执行的动作
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReportAction {
    /// 驳回举报
    #[serde(rename = "descartar")]
    Dismiss,
    /// 警告被举报用户
    #[serde(rename = "advertir")]
    WarnUser,
    #[serde(rename = "eliminar_contenido")]
    DeleteContent,
    #[serde(rename = "suspender_usuario")]
    SuspendUser,
}

/// 被举报对象类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportTarget {
    Usuario,
    Cancion,
    Playlist,
    Comentario,
}

/// 举报
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub tipo: ReportTarget,
    pub motivo: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub estado: ReportStatus,
    pub prioridad: ReportPriority,
    pub reportante: UserSummary,
    #[serde(default)]
    pub usuario_reportado: Option<UserSummary>,
    #[serde(default)]
    pub contenido_id: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
}

impl Keyed for Report {
    fn key(&self) -> &str {
        &self.id
    }
}

/// 后台用户搜索结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub suspendido: bool,
    #[serde(default)]
    pub suspendido_hasta: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_reportes: u32,
}

impl AdminUser {
    /// 界面上的状态标记
    pub fn badge(&self) -> &'static str {
        if self.suspendido {
            "suspendido"
        } else {
            "activo"
        }
    }
}

impl Keyed for AdminUser {
    fn key(&self) -> &str {
        &self.id
    }
}

/// 用户行为历史记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorEntry {
    pub id: String,
    pub accion: String,
    #[serde(default)]
    pub motivo: Option<String>,
    #[serde(default)]
    pub administrador: Option<String>,
    pub fecha: DateTime<Utc>,
}

/// 可被删除的内容类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Cancion,
    Playlist,
    Comentario,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Cancion => "cancion",
            ContentKind::Playlist => "playlist",
            ContentKind::Comentario => "comentario",
        }
    }
}

/// 内容搜索结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub tipo: ContentKind,
    pub titulo: String,
    #[serde(default)]
    pub autor: Option<UserSummary>,
    #[serde(default)]
    pub fecha_creacion: Option<DateTime<Utc>>,
}

impl Keyed for ContentItem {
    fn key(&self) -> &str {
        &self.id
    }
}
