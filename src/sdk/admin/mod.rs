//! 管理后台模块：统计、举报、用户处罚、内容审核

pub mod api;
pub mod models;
pub mod moderation;
pub mod service;
pub mod types;

pub use api::AdminApi;
pub use models::{
    AdminUser, BehaviorEntry, ContentItem, ContentKind, DashboardStats, Report, ReportAction,
    ReportPriority, ReportStatus, ReportTarget,
};
pub use moderation::{ContentModerationScreen, UserModerationScreen};
pub use service::{DashboardScreen, DashboardState, ReportsScreen};
pub use types::{ContentQuery, ReportFilter};
