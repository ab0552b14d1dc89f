//! 客户端配置
//!
//! 配置对象在启动时显式构造并传入 `SonoraClient`，不依赖任何全局变量，
//! 因此多个会话或测试替身可以同时存在。

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// 心跳默认间隔：180 000 ms
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 180_000;
/// Toast 默认显示时长：4 000 ms
pub const DEFAULT_TOAST_DURATION_MS: u64 = 4_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// REST API 基础地址，例如 `http://localhost:3000/api`
    pub api_base_url: String,
    /// 在线心跳间隔
    pub heartbeat_interval: Duration,
    /// Toast 默认显示时长
    pub toast_duration: Duration,
    /// 单次 HTTP 请求超时
    pub request_timeout: Duration,
    /// 持久化 token 的 SQLite URL，为 None 时 token 只保存在内存
    ///
    /// 例如：`sqlite://sonora.db?mode=rwc`
    pub token_db_url: Option<String>,
    pub user_agent: String,
}

impl ClientConfig {
    /// 创建默认配置
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url.into()),
            heartbeat_interval: Duration::from_millis(DEFAULT_HEARTBEAT_INTERVAL_MS),
            toast_duration: Duration::from_millis(DEFAULT_TOAST_DURATION_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            token_db_url: None,
            user_agent: format!("sonora-sdk-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// 从配置文件（可选）和 `SONORA_*` 环境变量加载配置
    ///
    /// 环境变量优先于文件，例如 `SONORA_API_BASE_URL`、`SONORA_HEARTBEAT_INTERVAL_MS`。
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        let raw: RawConfig = builder
            .add_source(config::Environment::with_prefix("SONORA"))
            .build()
            .context("读取配置失败")?
            .try_deserialize()
            .context("解析配置失败")?;

        raw.into_config()
    }
}

/// 配置文件 / 环境变量的原始形态，所有字段均可缺省
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    api_base_url: Option<String>,
    heartbeat_interval_ms: Option<u64>,
    toast_duration_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    token_db_url: Option<String>,
    user_agent: Option<String>,
}

impl RawConfig {
    fn into_config(self) -> Result<ClientConfig> {
        let base = self
            .api_base_url
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("缺少 api_base_url 配置"))?;
        let mut cfg = ClientConfig::new(base);

        if let Some(ms) = self.heartbeat_interval_ms {
            anyhow::ensure!(ms > 0, "heartbeat_interval_ms 必须大于 0");
            cfg.heartbeat_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.toast_duration_ms {
            cfg.toast_duration = Duration::from_millis(ms);
        }
        if let Some(secs) = self.request_timeout_secs {
            cfg.request_timeout = Duration::from_secs(secs);
        }
        cfg.token_db_url = self.token_db_url.filter(|s| !s.is_empty());
        if let Some(ua) = self.user_agent {
            cfg.user_agent = ua;
        }
        Ok(cfg)
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ui_constants() {
        let cfg = ClientConfig::new("http://localhost:3000/api/");
        assert_eq!(cfg.api_base_url, "http://localhost:3000/api");
        assert_eq!(cfg.heartbeat_interval, Duration::from_millis(180_000));
        assert_eq!(cfg.toast_duration, Duration::from_millis(4_000));
        assert!(cfg.token_db_url.is_none());
    }

    #[test]
    fn raw_config_overrides_defaults() {
        let raw = RawConfig {
            api_base_url: Some("https://api.sonora.test".into()),
            heartbeat_interval_ms: Some(60_000),
            token_db_url: Some(String::new()),
            ..Default::default()
        };
        let cfg = raw.into_config().unwrap();
        assert_eq!(cfg.heartbeat_interval, Duration::from_secs(60));
        assert_eq!(cfg.toast_duration, Duration::from_millis(4_000));
        assert!(cfg.token_db_url.is_none());
    }

    #[test]
    fn missing_base_url_is_rejected() {
        assert!(RawConfig::default().into_config().is_err());

        let raw = RawConfig {
            api_base_url: Some("http://x".into()),
            heartbeat_interval_ms: Some(0),
            ..Default::default()
        };
        assert!(raw.into_config().is_err());
    }
}
