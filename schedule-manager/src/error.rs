use std::path::PathBuf;

use thiserror::Error;

use crate::domain::schedule_model::MonthKey;

/// 永続化層 (key-value ストア) のエラー
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialise value for `{key}`: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored value under `{key}` is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 外部の行データ取得のエラー
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("row source is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("invalid row source url: {0}")]
    InvalidUrl(String),

    #[error("request to row source failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read rows from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("row data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// アプリケーション層 (コマンド) のエラー
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no data found in the row source")]
    EmptySource,

    #[error("no events found for {}", .0.label())]
    NoEventsForMonth(MonthKey),

    #[error("wiping all schedule data requires explicit confirmation")]
    NotConfirmed,
}
