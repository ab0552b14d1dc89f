//! 在线状态心跳
//!
//! 会话存活期间：启动时立即发送一次心跳，之后每个间隔（默认 180 000 ms）发送一次。
//! 停止（或句柄被 drop）后不再发送任何信号，也不发送"离线"通知，
//! 服务端依靠心跳超时判断离线。心跳失败只记 debug 日志，不重试，等下一次 tick。

use crate::sdk::error::ApiResult;
use crate::sdk::http::{Ack, ApiClient, NO_QUERY};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 心跳发送接口
#[async_trait]
pub trait PresenceSender: Send + Sync {
    async fn send_heartbeat(&self) -> ApiResult<()>;
}

/// 好友在线状态
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FriendPresence {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub last_connection: Option<DateTime<Utc>>,
}

/// 在线状态 HTTP API
#[derive(Clone)]
pub struct PresenceApi {
    http: ApiClient,
}

impl PresenceApi {
    pub fn new(http: ApiClient) -> Self {
        Self { http }
    }

    /// 获取好友的在线状态
    pub async fn get_friends_presence(&self) -> ApiResult<Vec<FriendPresence>> {
        self.http
            .get_json("/presence/amigos", NO_QUERY, "好友在线状态")
            .await
    }
}

#[async_trait]
impl PresenceSender for PresenceApi {
    async fn send_heartbeat(&self) -> ApiResult<()> {
        let _: Ack = self.http.post_empty("/presence/heartbeat", "心跳").await?;
        Ok(())
    }
}

/// 心跳任务
pub struct Heartbeat;

impl Heartbeat {
    /// 启动心跳任务，返回的句柄决定任务生命周期
    ///
    /// 间隔为 0 时不启动任务，返回的句柄已处于停止状态。
    pub fn start(sender: Arc<dyn PresenceSender>, every: Duration) -> HeartbeatHandle {
        let cancel = CancellationToken::new();
        if every.is_zero() {
            warn!("[Presence] 心跳间隔为 0，不启动心跳");
            cancel.cancel();
            return HeartbeatHandle { cancel, task: None };
        }
        let stopped = cancel.clone();

        info!("[Presence] 💓 启动心跳，间隔 {} ms", every.as_millis());
        let task = tokio::spawn(async move {
            // interval 的第一次 tick 立即完成
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut sent: u64 = 0;
            loop {
                tokio::select! {
                    biased;
                    _ = stopped.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = stopped.cancelled() => break,
                    res = sender.send_heartbeat() => {
                        sent += 1;
                        match res {
                            Ok(()) => debug!("[Presence] 心跳 #{} 已发送", sent),
                            Err(e) => debug!("[Presence] 心跳 #{} 失败（忽略）: {}", sent, e),
                        }
                    }
                }
            }
            debug!("[Presence] 心跳任务结束，共发送 {} 次", sent);
        });

        HeartbeatHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// 心跳句柄，drop 时自动停止
pub struct HeartbeatHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl HeartbeatHandle {
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// 停止心跳；不会发送最后一次信号
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            info!("[Presence] 停止心跳");
            self.cancel.cancel();
        }
    }

    /// 停止并等待任务退出
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
