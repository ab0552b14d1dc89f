//! 管理后台 API DTO

use crate::sdk::admin::models::{
    AdminUser, BehaviorEntry, ContentItem, ContentKind, Report, ReportAction, ReportPriority,
    ReportStatus,
};
use crate::sdk::types::deserialize_vec_or_null;
use serde::{Deserialize, Serialize};

/// 举报列表过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub priority: Option<ReportPriority>,
    pub page: Option<u32>,
}

impl ReportFilter {
    /// 只看待处理举报
    pub fn pending() -> Self {
        Self {
            status: Some(ReportStatus::Pending),
            ..Default::default()
        }
    }

    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("estado", status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            query.push(("prioridad", priority.as_str().to_string()));
        }
        if let Some(page) = self.page {
            query.push(("pagina", page.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsResp {
    #[serde(rename = "reportes", default, deserialize_with = "deserialize_vec_or_null")]
    pub reports: Vec<Report>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveReportReq<'a> {
    #[serde(rename = "accion")]
    pub action: ReportAction,
    #[serde(rename = "notas", skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportStatusReq {
    #[serde(rename = "estado")]
    pub status: ReportStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersResp {
    #[serde(rename = "usuarios", default, deserialize_with = "deserialize_vec_or_null")]
    pub users: Vec<AdminUser>,
}

/// 暂停用户：`{motivo, duracionDias}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspendUserReq<'a> {
    pub motivo: &'a str,
    pub duracion_dias: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResp {
    #[serde(rename = "historial", default, deserialize_with = "deserialize_vec_or_null")]
    pub entries: Vec<BehaviorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentResp {
    #[serde(rename = "resultados", default, deserialize_with = "deserialize_vec_or_null")]
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteContentReq<'a> {
    pub motivo: &'a str,
}

/// 内容搜索条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentQuery {
    pub text: String,
    pub kind: Option<ContentKind>,
}

impl ContentQuery {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("q", self.text.trim().to_string())];
        if let Some(kind) = self.kind {
            query.push(("tipo", kind.as_str().to_string()));
        }
        query
    }
}
