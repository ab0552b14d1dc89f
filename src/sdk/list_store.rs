//! 通用列表状态（好友申请、好友、黑名单、举报等界面共用）
//!
//! 状态包括有序列表、`loading` 标志以及 `action_loading`（当前有进行中操作的条目 ID）。
//! - 拉取：拉取前 `loading=true`，成功或失败后都置回 `false`；被更新的拉取取代、
//!   或在列表关闭后才返回的结果会被丢弃。
//! - 操作：每个列表同时最多一个进行中的操作；成功后按需从本地列表移除该条目
//!   （乐观移除，没有回滚），失败时列表保持不变，错误交给调用方展示。
//! - 关闭：取消所有进行中的请求。

use crate::sdk::error::{ApiError, ApiResult};
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 列表条目需要提供稳定的 ID
pub trait Keyed {
    fn key(&self) -> &str;
}

/// 列表状态快照
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub action_loading: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            action_loading: None,
        }
    }
}

/// 操作成功后本地列表的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// 从本地列表移除该条目
    Remove,
    /// 保持不变（调用方随后会重新拉取）
    Keep,
}

/// 列表状态变更监听器
#[async_trait]
pub trait ListListener<T: Send + Sync + 'static>: Send + Sync {
    async fn on_list_changed(&self, list: &'static str, state: ListState<T>);
}

/// 默认空实现（无操作）
pub struct EmptyListListener;

#[async_trait]
impl<T: Send + Sync + 'static> ListListener<T> for EmptyListListener {
    async fn on_list_changed(&self, _list: &'static str, _state: ListState<T>) {}
}

struct Inner<T: Send + Sync + 'static> {
    name: &'static str,
    state: Mutex<ListState<T>>,
    generation: AtomicU64,
    lifetime: CancellationToken,
    listener: Arc<dyn ListListener<T>>,
}

/// 通用列表存储，克隆后共享同一份状态
pub struct ListStore<T: Send + Sync + 'static> {
    inner: Arc<Inner<T>>,
}

impl<T: Send + Sync + 'static> Clone for ListStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> ListStore<T>
where
    T: Keyed + Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self::with_listener(name, Arc::new(EmptyListListener))
    }

    pub fn with_listener(name: &'static str, listener: Arc<dyn ListListener<T>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                state: Mutex::new(ListState::default()),
                generation: AtomicU64::new(0),
                lifetime: CancellationToken::new(),
                listener,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn snapshot(&self) -> ListState<T> {
        self.inner
            .state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn items(&self) -> Vec<T> {
        self.snapshot().items
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().map(|s| s.loading).unwrap_or(false)
    }

    pub fn action_loading(&self) -> Option<String> {
        self.inner
            .state
            .lock()
            .ok()
            .and_then(|s| s.action_loading.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .state
            .lock()
            .map(|s| s.items.iter().any(|i| i.key() == key))
            .unwrap_or(false)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lifetime.is_cancelled()
    }

    /// 拉取并整体替换列表
    pub async fn refresh<Fut>(&self, fetch: Fut) -> ApiResult<()>
    where
        Fut: Future<Output = ApiResult<Vec<T>>>,
    {
        self.refresh_with(async move { fetch.await.map(|items| (items, ())) })
            .await
            .map(|_| ())
    }

    /// 拉取并整体替换列表，同时带回列表以外的数据（如总数）
    ///
    /// 只有结果被采用时才返回 `Some`；过期的拉取返回 `Ok(None)`。
    pub async fn refresh_with<X, Fut>(&self, fetch: Fut) -> ApiResult<Option<X>>
    where
        Fut: Future<Output = ApiResult<(Vec<T>, X)>>,
    {
        if self.is_closed() {
            return Err(ApiError::Cancelled);
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.update(|s| s.loading = true);
        self.notify().await;

        let result = tokio::select! {
            biased;
            _ = self.inner.lifetime.cancelled() => Err(ApiError::Cancelled),
            res = fetch => res,
        };

        if self.is_closed() {
            debug!("[{}] 列表已关闭，丢弃拉取结果", self.inner.name);
            self.update(|s| s.loading = false);
            return Err(ApiError::Cancelled);
        }

        let latest = self.inner.generation.load(Ordering::SeqCst) == generation;
        if !latest {
            debug!("[{}] 拉取结果已过期（第 {} 次），丢弃", self.inner.name, generation);
            return result.map(|_| None);
        }

        let outcome = match result {
            Ok((items, extra)) => {
                info!("[{}] 拉取完成，共 {} 条", self.inner.name, items.len());
                self.update(|s| {
                    s.items = items;
                    s.loading = false;
                });
                Ok(Some(extra))
            }
            Err(e) => {
                warn!("[{}] 拉取失败: {}", self.inner.name, e);
                self.update(|s| s.loading = false);
                Err(e)
            }
        };
        self.notify().await;
        outcome
    }

    /// 对某个条目执行操作，成功后从列表移除
    pub async fn act<R, Fut>(&self, key: &str, request: Fut) -> ApiResult<R>
    where
        Fut: Future<Output = ApiResult<R>>,
    {
        self.act_with(key, Reconcile::Remove, request).await
    }

    /// 对某个条目执行操作，成功后按 `reconcile` 处理本地列表
    pub async fn act_with<R, Fut>(&self, key: &str, reconcile: Reconcile, request: Fut) -> ApiResult<R>
    where
        Fut: Future<Output = ApiResult<R>>,
    {
        self.run_action(key, request, |items, _| {
            if reconcile == Reconcile::Remove {
                items.retain(|i| i.key() != key);
            }
        })
        .await
    }

    /// 对某个条目执行操作，成功后用响应原地修改该条目
    pub async fn act_and_update<R, Fut, F>(&self, key: &str, request: Fut, apply: F) -> ApiResult<R>
    where
        Fut: Future<Output = ApiResult<R>>,
        F: FnOnce(&mut T, &R),
    {
        self.run_action(key, request, |items, resp| {
            if let Some(item) = items.iter_mut().find(|i| i.key() == key) {
                apply(item, resp);
            }
        })
        .await
    }

    async fn run_action<R, Fut, F>(&self, key: &str, request: Fut, on_success: F) -> ApiResult<R>
    where
        Fut: Future<Output = ApiResult<R>>,
        F: FnOnce(&mut Vec<T>, &R),
    {
        if self.is_closed() {
            return Err(ApiError::Cancelled);
        }
        let acquired = self
            .inner
            .state
            .lock()
            .map(|mut s| {
                if s.action_loading.is_some() {
                    false
                } else {
                    s.action_loading = Some(key.to_string());
                    true
                }
            })
            .unwrap_or(false);
        if !acquired {
            debug!("[{}] 已有进行中的操作，拒绝 {}", self.inner.name, key);
            return Err(ApiError::Busy);
        }
        self.notify().await;

        let result = tokio::select! {
            biased;
            _ = self.inner.lifetime.cancelled() => Err(ApiError::Cancelled),
            res = request => res,
        };

        if self.is_closed() {
            debug!("[{}] 列表已关闭，丢弃操作结果: {}", self.inner.name, key);
            self.update(|s| s.action_loading = None);
            return Err(ApiError::Cancelled);
        }

        self.update(|s| {
            s.action_loading = None;
            if let Ok(resp) = &result {
                on_success(&mut s.items, resp);
            }
        });
        if result.is_ok() {
            debug!("[{}] 操作成功: {}", self.inner.name, key);
        }
        self.notify().await;
        result
    }

    /// 仅修改本地列表（不发请求）
    pub async fn remove_local(&self, key: &str) -> bool {
        let mut removed = false;
        self.update(|s| {
            let before = s.items.len();
            s.items.retain(|i| i.key() != key);
            removed = s.items.len() != before;
        });
        if removed {
            self.notify().await;
        }
        removed
    }

    /// 关闭列表：取消进行中的拉取和操作，之后的结果全部丢弃
    pub fn close(&self) {
        if !self.inner.lifetime.is_cancelled() {
            debug!("[{}] 关闭列表", self.inner.name);
            self.inner.lifetime.cancel();
        }
    }

    fn update(&self, f: impl FnOnce(&mut ListState<T>)) {
        if let Ok(mut state) = self.inner.state.lock() {
            f(&mut state);
        }
    }

    async fn notify(&self) {
        let snapshot = self.snapshot();
        self.inner
            .listener
            .on_list_changed(self.inner.name, snapshot)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::sleep;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str);

    impl Keyed for Item {
        fn key(&self) -> &str {
            self.0
        }
    }

    fn boom() -> ApiError {
        ApiError::Http {
            status: 500,
            message: "fallo".into(),
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(bool, usize)>>);

    #[async_trait]
    impl ListListener<Item> for Recorder {
        async fn on_list_changed(&self, _list: &'static str, state: ListState<Item>) {
            self.0.lock().unwrap().push((state.loading, state.items.len()));
        }
    }

    #[tokio::test]
    async fn loading_brackets_successful_fetch() {
        let recorder = Arc::new(Recorder::default());
        let store: ListStore<Item> = ListStore::with_listener("solicitudes", recorder.clone());
        let view = store.clone();

        store
            .refresh(async move {
                assert!(view.is_loading());
                Ok(vec![Item("a"), Item("b")])
            })
            .await
            .unwrap();

        assert!(!store.is_loading());
        assert_eq!(store.items(), vec![Item("a"), Item("b")]);
        assert_eq!(*recorder.0.lock().unwrap(), vec![(true, 0), (false, 2)]);
    }

    #[tokio::test]
    async fn loading_cleared_on_failed_fetch() {
        let store = ListStore::new("amigos");
        store.refresh(async { Ok(vec![Item("a")]) }).await.unwrap();
        let view = store.clone();

        let res = store
            .refresh(async move {
                assert!(view.is_loading());
                Err::<Vec<Item>, _>(boom())
            })
            .await;

        assert!(res.is_err());
        assert!(!store.is_loading());
        assert_eq!(store.items(), vec![Item("a")]);
    }

    #[tokio::test]
    async fn successful_action_removes_only_that_item() {
        let store = ListStore::new("bloqueados");
        store
            .refresh(async { Ok(vec![Item("a"), Item("b"), Item("c")]) })
            .await
            .unwrap();

        store.act("b", async { Ok(()) }).await.unwrap();

        assert_eq!(store.items(), vec![Item("a"), Item("c")]);
        assert_eq!(store.action_loading(), None);
    }

    #[tokio::test]
    async fn failed_action_leaves_list_unchanged() {
        let store = ListStore::new("bloqueados");
        store
            .refresh(async { Ok(vec![Item("a"), Item("b")]) })
            .await
            .unwrap();

        let res = store.act("a", async { Err::<(), _>(boom()) }).await;

        assert_eq!(res.unwrap_err().user_message(), "fallo");
        assert_eq!(store.items(), vec![Item("a"), Item("b")]);
        assert_eq!(store.action_loading(), None);
    }

    #[tokio::test]
    async fn keep_reconcile_does_not_remove() {
        let store = ListStore::new("usuarios");
        store.refresh(async { Ok(vec![Item("a")]) }).await.unwrap();
        store
            .act_with("a", Reconcile::Keep, async { Ok(()) })
            .await
            .unwrap();
        assert!(store.contains("a"));
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        id: &'static str,
        hits: u32,
    }

    impl Keyed for Counter {
        fn key(&self) -> &str {
            self.id
        }
    }

    #[tokio::test]
    async fn update_in_place_uses_response() {
        let store = ListStore::new("contadores");
        store
            .refresh(async { Ok(vec![Counter { id: "a", hits: 1 }, Counter { id: "b", hits: 1 }]) })
            .await
            .unwrap();

        let hits = store
            .act_and_update("b", async { Ok(7u32) }, |c, hits| c.hits = *hits)
            .await
            .unwrap();

        assert_eq!(hits, 7);
        assert_eq!(
            store.items(),
            vec![Counter { id: "a", hits: 1 }, Counter { id: "b", hits: 7 }]
        );
    }

    #[tokio::test]
    async fn second_action_while_one_in_flight_is_busy() {
        let store = ListStore::new("solicitudes");
        store
            .refresh(async { Ok(vec![Item("a"), Item("b")]) })
            .await
            .unwrap();

        let (release, wait) = oneshot::channel::<()>();
        let first = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .act("a", async move {
                        let _ = wait.await;
                        Ok(())
                    })
                    .await
            })
        };
        while store.action_loading().is_none() {
            tokio::task::yield_now().await;
        }
        assert_eq!(store.action_loading().as_deref(), Some("a"));

        let second = store.act("b", async { Ok(()) }).await;
        assert!(matches!(second, Err(ApiError::Busy)));

        release.send(()).unwrap();
        first.await.unwrap().unwrap();
        assert_eq!(store.items(), vec![Item("b")]);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_fetch_does_not_overwrite_newer_one() {
        let store = ListStore::new("reportes");
        let slow = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .refresh(async {
                        sleep(Duration::from_millis(500)).await;
                        Ok(vec![Item("viejo")])
                    })
                    .await
            })
        };
        while !store.is_loading() {
            tokio::task::yield_now().await;
        }

        store.refresh(async { Ok(vec![Item("nuevo")]) }).await.unwrap();
        slow.await.unwrap().unwrap();

        assert_eq!(store.items(), vec![Item("nuevo")]);
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn close_cancels_in_flight_fetch() {
        let store: ListStore<Item> = ListStore::new("amigos");
        let pending = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .refresh(async {
                        sleep(Duration::from_secs(30)).await;
                        Ok(vec![Item("tarde")])
                    })
                    .await
            })
        };
        sleep(Duration::from_millis(10)).await;
        store.close();

        assert!(matches!(pending.await.unwrap(), Err(ApiError::Cancelled)));
        assert!(store.items().is_empty());
        assert!(!store.is_loading());
        assert!(matches!(
            store.refresh(async { Ok(vec![Item("x")]) }).await,
            Err(ApiError::Cancelled)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn close_clears_in_flight_action_marker() {
        let store = ListStore::new("bloqueados");
        store.refresh(async { Ok(vec![Item("a")]) }).await.unwrap();
        let pending = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .act("a", async {
                        sleep(Duration::from_secs(30)).await;
                        Ok(())
                    })
                    .await
            })
        };
        while store.action_loading().is_none() {
            tokio::task::yield_now().await;
        }
        store.close();

        assert!(matches!(pending.await.unwrap(), Err(ApiError::Cancelled)));
        let state = store.snapshot();
        assert_eq!(state.action_loading, None);
        assert!(!state.loading);
        assert_eq!(state.items, vec![Item("a")]);
    }

    #[tokio::test(start_paused = true)]
    async fn extra_data_only_returned_for_accepted_fetch() {
        let store = ListStore::new("reportes");
        let slow = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .refresh_with(async {
                        sleep(Duration::from_millis(500)).await;
                        Ok((vec![Item("viejo")], 99u64))
                    })
                    .await
            })
        };
        while !store.is_loading() {
            tokio::task::yield_now().await;
        }

        let fresh = store
            .refresh_with(async { Ok((vec![Item("nuevo")], 1u64)) })
            .await
            .unwrap();

        assert_eq!(fresh, Some(1));
        assert_eq!(slow.await.unwrap().unwrap(), None);
        assert_eq!(store.items(), vec![Item("nuevo")]);
    }
}
