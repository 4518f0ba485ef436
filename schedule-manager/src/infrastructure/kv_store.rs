use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::error::StoreError;

/// JSON 値を保存する key-value ストア
///
/// 複数キーの書き込みは [`KeyValueStore::set_many`] で1回にまとめる。
/// 実装側はこれを1つのトランザクションとして扱うこと
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// 渡された順に全てのキーを書き込む。途中で失敗した場合は何も書き込まない
    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<(), StoreError>;

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.set_many(vec![(key.to_owned(), value)]).await
    }
}

// =====================
// SQLite 実装
// =====================

pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 接続文字列から pool を作り、マイグレーションまで済ませる
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // --- ディレクトリ作成（冪等） ---
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // メモリ DB は接続ごとに別の DB になるので1本に固定する
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!(database_url, "key-value store ready");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let raw = sqlx::query_scalar::<sqlx::Sqlite, String>(
            "SELECT value FROM kv_entries WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        raw.map(|text| {
            serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                key: key.to_owned(),
                source,
            })
        })
        .transpose()
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<(), StoreError> {
        // 1. 先に全部シリアライズしておく (トランザクション中に失敗しないように)
        let mut encoded = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let text = serde_json::to_string(&value).map_err(|source| {
                StoreError::Serialization {
                    key: key.clone(),
                    source,
                }
            })?;
            encoded.push((key, text));
        }

        // 2. トランザクション開始
        let mut tx = self.pool.begin().await?;

        for (key, text) in &encoded {
            sqlx::query(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at",
            )
            .bind(key.as_str())
            .bind(text.as_str())
            .execute(&mut *tx)
            .await?;
        }

        // 3. コミット
        tx.commit().await?;
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for key in keys {
            sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
                .bind(*key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

// =====================
// メモリ実装 (テスト・一時利用向け)
// =====================

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<(), StoreError> {
        let mut stored = self.entries.lock().await;
        stored.extend(entries);
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut stored = self.entries.lock().await;
        for key in keys {
            stored.remove(*key);
        }
        Ok(())
    }
}
