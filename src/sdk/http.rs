//! HTTP 核心：带认证的 REST 客户端
//!
//! 所有服务模块共用一个 `ApiClient`。每个请求自动附带 `Authorization: Bearer <token>`
//! 和 `X-Operation-ID`，响应统一经过 [`ApiClient::handle_http_response`] 处理：
//! 非 2xx 归一化为 [`ApiError`]，401 清除 token 并通知 [`SessionListener`]。

use crate::sdk::config::ClientConfig;
use crate::sdk::error::{extract_error_message, ApiError, ApiResult};
use crate::sdk::session::{EmptySessionListener, SessionListener, TokenStore};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 不关心响应体内容的接口使用此类型（空响应体同样可以解析）
pub type Ack = serde::de::IgnoredAny;

/// 无查询参数
pub const NO_QUERY: &[(&str, &str)] = &[];

/// 带认证的 REST 客户端，克隆开销很小，可在各服务间共享
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    session_listener: Arc<RwLock<Arc<dyn SessionListener>>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        if !config.api_base_url.starts_with("http://") && !config.api_base_url.starts_with("https://")
        {
            return Err(ApiError::InvalidConfig(format!(
                "api_base_url 必须以 http:// 或 https:// 开头: {}",
                config.api_base_url
            )));
        }

        let client = reqwest::ClientBuilder::new()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            tokens,
            session_listener: Arc::new(RwLock::new(Arc::new(EmptySessionListener))),
        })
    }

    /// 注册会话监听器（401 时回调）
    pub fn set_session_listener(&self, listener: Arc<dyn SessionListener>) {
        if let Ok(mut guard) = self.session_listener.write() {
            *guard = listener;
        }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 构造带认证头的请求
    pub async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let operation_id = Uuid::new_v4().to_string();
        let url = self.url(path);
        debug!("[HTTP] {} {} (operationID={})", method, url, operation_id);

        let mut builder = self
            .client
            .request(method, &url)
            .header("Accept", "application/json")
            .header("X-Operation-ID", operation_id);
        if let Some(token) = self.tokens.get().await {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    pub async fn get_json<T, Q>(&self, path: &str, query: &Q, operation_name: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).await.query(query);
        self.send(builder, operation_name).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B, operation_name: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path).await.json(body);
        self.send(builder, operation_name).await
    }

    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        operation_name: &str,
    ) -> ApiResult<T> {
        let builder = self.request(Method::POST, path).await;
        self.send(builder, operation_name).await
    }

    pub async fn put_json<T, B>(&self, path: &str, body: &B, operation_name: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path).await.json(body);
        self.send(builder, operation_name).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, operation_name: &str) -> ApiResult<T> {
        let builder = self.request(Method::DELETE, path).await;
        self.send(builder, operation_name).await
    }

    /// 带 JSON body 的 DELETE（例如删除内容时需要附带原因）
    pub async fn delete_json<T, B>(&self, path: &str, body: &B, operation_name: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::DELETE, path).await.json(body);
        self.send(builder, operation_name).await
    }

    /// multipart 上传（头像、横幅、歌单封面）
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        operation_name: &str,
    ) -> ApiResult<T> {
        let builder = self.request(Method::POST, path).await.multipart(form);
        self.send(builder, operation_name).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        operation_name: &str,
    ) -> ApiResult<T> {
        let response = builder.send().await.map_err(|e| {
            error!("[HTTP] {}请求失败: {}", operation_name, e);
            ApiError::Network(e)
        })?;
        self.handle_http_response(response, operation_name).await
    }

    /// 通用 HTTP 响应处理函数，所有 API 共用
    pub async fn handle_http_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        operation_name: &str,
    ) -> ApiResult<T> {
        let status = response.status();
        let body_bytes = response.bytes().await?;
        debug!(
            "[HTTP] {}响应 Body: {}",
            operation_name,
            String::from_utf8_lossy(&body_bytes)
        );

        if status == StatusCode::UNAUTHORIZED {
            warn!("[HTTP] {}返回 401，清除本地 token", operation_name);
            self.tokens.clear().await;
            let listener = self
                .session_listener
                .read()
                .map(|l| l.clone())
                .unwrap_or_else(|_| Arc::new(EmptySessionListener));
            listener.on_unauthorized().await;
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let err = normalize_http_error(status, &body_bytes);
            error!(
                "[HTTP] {}请求失败，HTTP状态: {}, 错误信息: {}",
                operation_name, status, err
            );
            return Err(err);
        }
        info!("[HTTP] {}请求成功，HTTP状态: {}", operation_name, status);

        // 204 或空 body 按 null 解析，配合 `Ack` / `Option<T>` 使用
        let body: &[u8] = if body_bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &body_bytes
        };
        serde_json::from_slice(body).map_err(|e| {
            error!("[HTTP] {}反序列化失败: {:?}", operation_name, e);
            ApiError::Decode(e)
        })
    }
}

/// 将非 2xx 响应归一化为带可读信息的错误
pub fn normalize_http_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = extract_error_message(body)
        .unwrap_or_else(|| format!("Error en la solicitud ({})", status.as_u16()));
    ApiError::Http {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::session::MemoryTokenStore;
    use crate::sdk::testkit::MockBackend;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn normalizes_error_bodies() {
        let err = normalize_http_error(
            StatusCode::BAD_REQUEST,
            br#"{"mensaje":"Ya son amigos"}"#,
        );
        assert_eq!(err.user_message(), "Ya son amigos");

        let err = normalize_http_error(StatusCode::BAD_GATEWAY, b"");
        assert_eq!(err.user_message(), "Error en la solicitud (502)");
    }

    #[test]
    fn rejects_base_url_without_scheme() {
        let cfg = ClientConfig::new("localhost:3000");
        let res = ApiClient::new(&cfg, Arc::new(MemoryTokenStore::new()));
        assert!(matches!(res, Err(ApiError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn attaches_bearer_token() {
        let backend = MockBackend::start().await;
        backend.respond("GET", "/eco", 200, json!({"ok": true}));
        let api = backend.client(Some("secreto"));

        let _: Ack = api.get_json("/eco", NO_QUERY, "eco").await.unwrap();

        let req = backend.last_request().unwrap();
        assert_eq!(req.authorization.as_deref(), Some("Bearer secreto"));
    }

    #[tokio::test]
    async fn empty_success_body_is_accepted() {
        let backend = MockBackend::start().await;
        backend.respond_empty("DELETE", "/vacio", 204);
        let api = backend.client(Some("t"));

        let res: ApiResult<Ack> = api.delete("/vacio", "vacio").await;
        assert!(res.is_ok());
    }

    struct CountingListener(AtomicUsize);

    #[async_trait]
    impl SessionListener for CountingListener {
        async fn on_unauthorized(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn unauthorized_clears_token_and_notifies() {
        let backend = MockBackend::start().await;
        backend.respond("GET", "/privado", 401, json!({"message": "Token inválido"}));
        let api = backend.client(Some("caducado"));
        let listener = Arc::new(CountingListener(AtomicUsize::new(0)));
        api.set_session_listener(listener.clone());

        let res: ApiResult<Ack> = api.get_json("/privado", NO_QUERY, "privado").await;

        assert!(matches!(res, Err(ApiError::Unauthorized)));
        assert_eq!(api.tokens().get().await, None);
        assert_eq!(listener.0.load(Ordering::SeqCst), 1);
    }
}
