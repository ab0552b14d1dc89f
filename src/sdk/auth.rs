//! 登录与登出

use crate::sdk::error::{ApiError, ApiResult};
use crate::sdk::friend::models::UserSummary;
use crate::sdk::http::ApiClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// 登录结果
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
    #[serde(default, alias = "usuario")]
    pub user: Option<UserSummary>,
}

#[derive(Clone)]
pub struct AuthApi {
    http: ApiClient,
}

impl AuthApi {
    pub fn new(http: ApiClient) -> Self {
        Self { http }
    }

    /// 登录并保存 token，之后的请求都会带上它
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginData> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::Validation(
                "Email y contraseña son obligatorios".into(),
            ));
        }
        info!("[Auth] 🔐 正在登录...");
        debug!("[Auth] 邮箱: {}", email);

        let data: LoginData = self
            .http
            .post_json("/auth/login", &LoginRequest { email, password }, "登录")
            .await?;
        if data.token.trim().is_empty() {
            return Err(ApiError::Http {
                status: 200,
                message: "Respuesta de login sin token".into(),
            });
        }
        self.http.tokens().set(data.token.clone()).await;
        info!(
            "[Auth] ✅ 登录成功: {}",
            data.user.as_ref().map(|u| u.username.as_str()).unwrap_or("-")
        );
        Ok(data)
    }

    /// 仅清除本地 token，不请求服务端
    pub async fn logout(&self) {
        self.http.tokens().clear().await;
        info!("[Auth] 已登出");
    }

    pub async fn is_logged_in(&self) -> bool {
        self.http.tokens().get().await.is_some()
    }
}
