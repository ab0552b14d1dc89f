//! Sonora 客户端
//!
//! 把配置、token 存储、HTTP 客户端、toast 与心跳组装在一起，
//! 各界面的状态层从这里创建，共享同一个 `ApiClient`。

use crate::sdk::admin::{
    AdminApi, ContentModerationScreen, DashboardScreen, ReportsScreen, UserModerationScreen,
};
use crate::sdk::auth::{AuthApi, LoginData};
use crate::sdk::config::ClientConfig;
use crate::sdk::error::{ApiError, ApiResult};
use crate::sdk::friend::{FriendApi, FriendListener, FriendScreen};
use crate::sdk::http::ApiClient;
use crate::sdk::playlist::{Playlist, PlaylistApi, PlaylistEditor};
use crate::sdk::presence::{Heartbeat, HeartbeatHandle, PresenceApi};
use crate::sdk::session::{MemoryTokenStore, SessionListener, SqliteTokenStore, TokenStore};
use crate::sdk::toast::{EmptyToastListener, ToastCenter, ToastListener};
use anyhow::Result;
use std::sync::{Arc, Mutex};
use tracing::info;

pub struct SonoraClient {
    config: ClientConfig,
    http: ApiClient,
    toasts: ToastCenter,
    heartbeat: Mutex<Option<HeartbeatHandle>>,
}

impl SonoraClient {
    /// 按配置创建客户端；配置了 `token_db_url` 时 token 持久化到 SQLite
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let tokens: Arc<dyn TokenStore> = match &config.token_db_url {
            Some(url) => Arc::new(SqliteTokenStore::open(url).await?),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Ok(Self::with_token_store(config, tokens)?)
    }

    pub fn with_token_store(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        if config.heartbeat_interval.is_zero() {
            return Err(ApiError::InvalidConfig(
                "heartbeat_interval 必须大于 0".into(),
            ));
        }
        let http = ApiClient::new(&config, tokens)?;
        let toasts = ToastCenter::new(Arc::new(EmptyToastListener), config.toast_duration);
        info!("[Client] 🚀 客户端已创建，API: {}", config.api_base_url);
        Ok(Self {
            config,
            http,
            toasts,
            heartbeat: Mutex::new(None),
        })
    }

    /// 替换 toast 监听器；之前显示中的 toast 会被关闭
    pub fn with_toast_listener(mut self, listener: Arc<dyn ToastListener>) -> Self {
        self.toasts.close();
        self.toasts = ToastCenter::new(listener, self.config.toast_duration);
        self
    }

    pub fn set_session_listener(&self, listener: Arc<dyn SessionListener>) {
        self.http.set_session_listener(listener);
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn http(&self) -> &ApiClient {
        &self.http
    }

    pub fn toasts(&self) -> &ToastCenter {
        &self.toasts
    }

    // ========== API ==========

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.http.clone())
    }

    pub fn friends(&self) -> FriendApi {
        FriendApi::new(self.http.clone())
    }

    pub fn admin(&self) -> AdminApi {
        AdminApi::new(self.http.clone())
    }

    pub fn playlists(&self) -> PlaylistApi {
        PlaylistApi::new(self.http.clone())
    }

    pub fn presence(&self) -> PresenceApi {
        PresenceApi::new(self.http.clone())
    }

    // ========== 界面状态 ==========

    pub fn friend_screen(&self, listener: Option<Arc<dyn FriendListener>>) -> FriendScreen {
        match listener {
            Some(listener) => FriendScreen::with_listener(self.friends(), self.toasts.clone(), listener),
            None => FriendScreen::new(self.friends(), self.toasts.clone()),
        }
    }

    pub fn dashboard_screen(&self) -> DashboardScreen {
        DashboardScreen::new(self.admin(), self.toasts.clone())
    }

    pub fn reports_screen(&self) -> ReportsScreen {
        ReportsScreen::new(self.admin(), self.toasts.clone())
    }

    pub fn user_moderation_screen(&self) -> UserModerationScreen {
        UserModerationScreen::new(self.admin(), self.toasts.clone())
    }

    pub fn content_moderation_screen(&self) -> ContentModerationScreen {
        ContentModerationScreen::new(self.admin(), self.toasts.clone())
    }

    pub fn playlist_editor(&self, playlist: Playlist) -> PlaylistEditor {
        PlaylistEditor::new(self.playlists(), self.toasts.clone(), playlist)
    }

    // ========== 会话 ==========

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginData> {
        self.auth().login(email, password).await
    }

    /// 停止心跳并清除本地 token
    pub async fn logout(&self) {
        self.stop_presence();
        self.auth().logout().await;
    }

    /// 启动在线心跳，已有心跳时先停止旧的
    pub fn start_presence(&self) {
        let handle = Heartbeat::start(Arc::new(self.presence()), self.config.heartbeat_interval);
        if let Ok(mut slot) = self.heartbeat.lock() {
            if let Some(old) = slot.replace(handle) {
                old.stop();
            }
        }
    }

    pub fn stop_presence(&self) {
        if let Ok(mut slot) = self.heartbeat.lock() {
            if let Some(handle) = slot.take() {
                handle.stop();
            }
        }
    }

    pub fn is_presence_running(&self) -> bool {
        self.heartbeat
            .lock()
            .map(|slot| slot.as_ref().is_some_and(HeartbeatHandle::is_running))
            .unwrap_or(false)
    }
}

impl Drop for SonoraClient {
    fn drop(&mut self) {
        self.stop_presence();
        self.toasts.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::testkit::MockBackend;
    use crate::sdk::toast::tests::RecordingToasts;
    use serde_json::json;
    use std::time::Duration;

    fn client(backend: &MockBackend) -> SonoraClient {
        let mut config = ClientConfig::new(backend.base_url());
        config.heartbeat_interval = Duration::from_millis(50);
        SonoraClient::with_token_store(config, Arc::new(MemoryTokenStore::new())).unwrap()
    }

    #[tokio::test]
    async fn login_then_heartbeat_carries_token() {
        let backend = MockBackend::start().await;
        backend.respond("POST", "/auth/login", 200, json!({"token": "jwt-9"}));
        backend.respond_empty("POST", "/presence/heartbeat", 204);
        let client = client(&backend);

        client.login("a@b.c", "x").await.unwrap();
        client.start_presence();
        assert!(client.is_presence_running());

        for _ in 0..100 {
            if !backend.requests_to("POST", "/presence/heartbeat").is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let beats = backend.requests_to("POST", "/presence/heartbeat");
        assert!(!beats.is_empty());
        assert_eq!(beats[0].authorization.as_deref(), Some("Bearer jwt-9"));

        client.logout().await;
        assert!(!client.is_presence_running());
        assert!(!client.auth().is_logged_in().await);
    }

    #[tokio::test]
    async fn zero_heartbeat_interval_is_rejected() {
        let mut config = ClientConfig::new("http://127.0.0.1:1");
        config.heartbeat_interval = Duration::ZERO;

        let res = SonoraClient::with_token_store(config, Arc::new(MemoryTokenStore::new()));
        assert!(matches!(res, Err(ApiError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn screens_share_toast_listener() {
        let backend = MockBackend::start().await;
        backend.respond("GET", "/admin/dashboard", 500, json!({}));
        let rec = Arc::new(RecordingToasts::default());
        let client = client(&backend).with_toast_listener(rec.clone());

        let dashboard = client.dashboard_screen();
        assert!(dashboard.refresh().await.is_err());

        assert_eq!(rec.shown()[0].message, "Error en la solicitud (500)");
    }

    #[tokio::test]
    async fn sqlite_token_survives_restart() {
        let path = std::env::temp_dir().join(format!("sonora-{}.db", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let backend = MockBackend::start().await;
        backend.respond("POST", "/auth/login", 200, json!({"token": "persistido"}));

        let mut config = ClientConfig::new(backend.base_url());
        config.token_db_url = Some(url);
        {
            let client = SonoraClient::new(config.clone()).await.unwrap();
            client.login("a@b.c", "x").await.unwrap();
        }
        let client = SonoraClient::new(config).await.unwrap();
        assert_eq!(client.http().tokens().get().await.as_deref(), Some("persistido"));

        drop(client);
        let _ = std::fs::remove_file(&path);
    }
}
