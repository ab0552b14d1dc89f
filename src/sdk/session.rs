//! 会话 token 存储
//!
//! 每次请求都会读取 token。同一会话内 token 视为不可变，并发请求读到的是同一个值。
//! 持久化实现使用 SQLite（sqlx），表结构由 `migrations/` 下的迁移管理。

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// token 存储接口
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self) -> Option<String>;
    async fn set(&self, token: String);
    async fn clear(&self);
}

/// 会话监听器：401 时 token 已被清除，由调用方决定如何回到登录页
#[async_trait]
pub trait SessionListener: Send + Sync {
    async fn on_unauthorized(&self);
}

/// 默认空实现（无操作）
pub struct EmptySessionListener;

#[async_trait]
impl SessionListener for EmptySessionListener {
    async fn on_unauthorized(&self) {}
}

/// 仅保存在内存中的 token
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    async fn set(&self, token: String) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token);
        }
    }

    async fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }
}

const TOKEN_SLOT: &str = "default";

/// SQLite 持久化的 token 存储，内存中保留一份副本避免每次请求都查库
pub struct SqliteTokenStore {
    db: Pool<Sqlite>,
    cached: RwLock<Option<String>>,
}

impl SqliteTokenStore {
    /// 连接数据库、执行迁移并加载已保存的 token
    pub async fn open(db_url: &str) -> Result<Self> {
        let db = create_sqlite_pool_with_migration(db_url).await?;
        Self::with_pool(db).await
    }

    pub async fn with_pool(db: Pool<Sqlite>) -> Result<Self> {
        let row = sqlx::query("SELECT token FROM session_tokens WHERE slot = ?")
            .bind(TOKEN_SLOT)
            .fetch_optional(&db)
            .await
            .context("读取已保存的 token 失败")?;
        let token = row.map(|r| r.get::<String, _>("token"));
        info!(
            "[Session] token 存储已就绪，已保存会话: {}",
            if token.is_some() { "是" } else { "否" }
        );
        Ok(Self {
            db,
            cached: RwLock::new(token),
        })
    }

    async fn persist(&self, token: Option<&str>) -> Result<()> {
        match token {
            Some(token) => {
                sqlx::query(
                    r#"
                    INSERT INTO session_tokens (slot, token, updated_at) VALUES (?, ?, ?)
                    ON CONFLICT(slot) DO UPDATE SET
                        token = excluded.token,
                        updated_at = excluded.updated_at
                    "#,
                )
                .bind(TOKEN_SLOT)
                .bind(token)
                .bind(chrono::Utc::now().timestamp_millis())
                .execute(&self.db)
                .await
                .context("保存 token 失败")?;
            }
            None => {
                sqlx::query("DELETE FROM session_tokens WHERE slot = ?")
                    .bind(TOKEN_SLOT)
                    .execute(&self.db)
                    .await
                    .context("删除 token 失败")?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn get(&self) -> Option<String> {
        self.cached.read().ok().and_then(|t| t.clone())
    }

    async fn set(&self, token: String) {
        if let Err(e) = self.persist(Some(&token)).await {
            warn!("[Session] {e:#}");
        }
        if let Ok(mut guard) = self.cached.write() {
            *guard = Some(token);
        }
        debug!("[Session] token 已更新");
    }

    async fn clear(&self) {
        if let Err(e) = self.persist(None).await {
            warn!("[Session] {e:#}");
        }
        if let Ok(mut guard) = self.cached.write() {
            *guard = None;
        }
        debug!("[Session] token 已清除");
    }
}

/// 创建 SQLite 连接池并执行所有未执行的迁移
pub async fn create_sqlite_pool_with_migration(db_url: &str) -> Result<Pool<Sqlite>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context(format!("连接SQLite数据库失败: {}", db_url))?;

    sqlx::migrate!().run(&pool).await.context("执行数据库迁移失败")?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_set_and_clear() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get().await, None);
        store.set("abc".into()).await;
        assert_eq!(store.get().await.as_deref(), Some("abc"));
        store.clear().await;
        assert_eq!(store.get().await, None);
    }

    #[tokio::test]
    async fn sqlite_store_survives_reopen() {
        // 单连接内存库：同一个连接池内数据共享
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();

        let store = SqliteTokenStore::with_pool(pool.clone()).await.unwrap();
        store.set("persisted-token".into()).await;

        let reopened = SqliteTokenStore::with_pool(pool.clone()).await.unwrap();
        assert_eq!(reopened.get().await.as_deref(), Some("persisted-token"));

        reopened.clear().await;
        let again = SqliteTokenStore::with_pool(pool).await.unwrap();
        assert_eq!(again.get().await, None);
    }
}
