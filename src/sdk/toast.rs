//! Toast 通知
//!
//! 每条 toast 在显示时长到期或被手动关闭时触发一次 `on_close`，两者只会发生其一。
//! `ToastCenter` 关闭（或被 drop）后所有计时器取消，不再有任何回调。

use crate::sdk::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Toast 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToastKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ToastKind::Success),
            "error" => Ok(ToastKind::Error),
            "warning" => Ok(ToastKind::Warning),
            "info" => Ok(ToastKind::Info),
            other => Err(format!("tipo de toast desconocido: {other}")),
        }
    }
}

pub type ToastId = u64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub kind: ToastKind,
    #[serde(skip)]
    pub duration: Duration,
}

/// Toast 监听器回调接口
#[async_trait]
pub trait ToastListener: Send + Sync {
    async fn on_show(&self, toast: Toast);

    async fn on_close(&self, id: ToastId);
}

/// 默认空实现（无操作）
pub struct EmptyToastListener;

#[async_trait]
impl ToastListener for EmptyToastListener {
    async fn on_show(&self, _toast: Toast) {}

    async fn on_close(&self, _id: ToastId) {}
}

type ActiveToasts = Arc<Mutex<HashMap<ToastId, (Toast, CancellationToken)>>>;

struct Inner {
    listener: Arc<dyn ToastListener>,
    default_duration: Duration,
    active: ActiveToasts,
    next_id: AtomicU64,
    closed: CancellationToken,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}

/// Toast 管理器，克隆后共享同一组 toast
#[derive(Clone)]
pub struct ToastCenter {
    inner: Arc<Inner>,
}

impl ToastCenter {
    pub fn new(listener: Arc<dyn ToastListener>, default_duration: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                listener,
                default_duration,
                active: Arc::new(Mutex::new(HashMap::new())),
                next_id: AtomicU64::new(1),
                closed: CancellationToken::new(),
            }),
        }
    }

    /// 显示一条 toast，`duration` 为 None 时使用默认时长
    pub async fn show(
        &self,
        message: impl Into<String>,
        kind: ToastKind,
        duration: Option<Duration>,
    ) -> ToastId {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.into(),
            kind,
            duration: duration.unwrap_or(self.inner.default_duration),
        };

        if self.inner.closed.is_cancelled() {
            warn!("[Toast] 已关闭，忽略 toast #{}", id);
            return id;
        }

        let timer = self.inner.closed.child_token();
        if let Ok(mut active) = self.inner.active.lock() {
            active.insert(id, (toast.clone(), timer.clone()));
        }
        debug!("[Toast] 显示 #{} [{}] {}", id, kind, toast.message);

        let active = self.inner.active.clone();
        let listener = self.inner.listener.clone();
        let after = toast.duration;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = timer.cancelled() => {}
                _ = tokio::time::sleep(after) => {
                    if take(&active, id).is_some() {
                        debug!("[Toast] #{} 到期自动关闭", id);
                        listener.on_close(id).await;
                    }
                }
            }
        });

        self.inner.listener.on_show(toast).await;
        id
    }

    pub async fn success(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Success, None).await
    }

    pub async fn error(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Error, None).await
    }

    pub async fn warning(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Warning, None).await
    }

    pub async fn info(&self, message: impl Into<String>) -> ToastId {
        self.show(message, ToastKind::Info, None).await
    }

    /// 将服务层错误转换为 toast；`Busy` 和 `Cancelled` 不打扰用户，校验失败用 warning
    pub async fn report(&self, scope: &str, err: &ApiError) {
        match err {
            ApiError::Busy | ApiError::Cancelled => {
                debug!("[{}] 操作被忽略: {}", scope, err);
            }
            ApiError::Validation(msg) => {
                debug!("[{}] 校验失败: {}", scope, msg);
                self.warning(msg.clone()).await;
            }
            other => {
                error!("[{}] ❌ {}", scope, other);
                self.error(other.user_message()).await;
            }
        }
    }

    /// 手动关闭；返回 false 表示该 toast 已不存在
    pub async fn dismiss(&self, id: ToastId) -> bool {
        match take(&self.inner.active, id) {
            Some((_, timer)) => {
                timer.cancel();
                debug!("[Toast] #{} 手动关闭", id);
                self.inner.listener.on_close(id).await;
                true
            }
            None => false,
        }
    }

    /// 当前显示中的 toast，按 id 排序
    pub fn active(&self) -> Vec<Toast> {
        let mut toasts: Vec<Toast> = self
            .inner
            .active
            .lock()
            .map(|a| a.values().map(|(t, _)| t.clone()).collect())
            .unwrap_or_default();
        toasts.sort_by_key(|t| t.id);
        toasts
    }

    /// 取消所有计时器，之后不再触发任何回调
    pub fn close(&self) {
        self.inner.closed.cancel();
        if let Ok(mut active) = self.inner.active.lock() {
            active.clear();
        }
    }
}

fn take(active: &ActiveToasts, id: ToastId) -> Option<(Toast, CancellationToken)> {
    active.lock().ok().and_then(|mut a| a.remove(&id))
}
