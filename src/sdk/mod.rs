pub mod admin;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod friend;
pub mod http;
pub mod list_store;
pub mod playlist;
pub mod presence;
pub mod session;
pub mod toast;
pub mod types;

#[cfg(test)]
pub(crate) mod testkit;

// 重新导出认证相关类型
pub use auth::{AuthApi, LoginData};
pub use client::SonoraClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
