use std::sync::Arc;

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

use config::ScheduleConfig;
use error::StoreError;
use infrastructure::kv_store::{KeyValueStore, SqliteKvStore};
use infrastructure::schedule_repo::ScheduleRepository;
use infrastructure::sheets_source::SheetsRowSource;

// 全てのリポジトリを保持するコンテナ
pub struct ScheduleServices {
    pub schedule: ScheduleRepository,
}

impl ScheduleServices {
    pub fn new(store: Arc<dyn KeyValueStore>, history_limit: usize) -> Self {
        Self {
            schedule: ScheduleRepository::new(store).with_history_limit(history_limit),
        }
    }

    /// 設定の DB に接続し (なければ作成)、マイグレーションを実行する
    pub async fn connect(config: &ScheduleConfig) -> Result<Self, StoreError> {
        let store = SqliteKvStore::connect(&config.database_url).await?;
        tracing::info!(database_url = %config.database_url, "connected to schedule store");
        Ok(Self::new(Arc::new(store), config.history_limit))
    }
}

/// Google Sheets の設定があれば取得元を作る
pub fn sheets_row_source(config: &ScheduleConfig) -> Option<SheetsRowSource> {
    config.sheet.clone().map(SheetsRowSource::new)
}
