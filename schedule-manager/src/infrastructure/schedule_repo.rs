use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::schedule_model::{
    MonthHistory, MonthKey, PublishedMap, PublishedMonthSnapshot, VersionRef,
    DEFAULT_HISTORY_LIMIT,
};
use crate::domain::shift_record::ShiftRecord;
use crate::error::StoreError;
use crate::infrastructure::kv_store::KeyValueStore;

/// 公開中スナップショット (月 -> スナップショット) を保存するキー
pub const PUBLISHED_SCHEDULE_KEY: &str = "perfusionPublishedSchedule";
/// 過去バージョン (月 -> 新しい順の配列) を保存するキー
pub const SCHEDULE_HISTORY_KEY: &str = "perfusionScheduleHistory";

/// 月単位でバージョン管理された公開スケジュールのリポジトリ
///
/// 2つのマップ (公開中 / 履歴) をそれぞれ1つの JSON 値としてストアに置く。
/// 公開処理は読み込み → 更新 → 書き込みになるので、
/// 同じプロセス内では `write_lock` で直列化する
pub struct ScheduleRepository {
    store: Arc<dyn KeyValueStore>,
    history_limit: usize,
    write_lock: Mutex<()>,
}

impl ScheduleRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            history_limit: DEFAULT_HISTORY_LIMIT,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    // =====================
    // 読み込み
    // =====================

    /// キーが存在しなければ空のマップとして扱う。
    /// 読めない値は Corrupt として返す (空扱いにはしない)
    async fn load<T>(&self, key: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        match self.store.get(key).await? {
            Some(value) => serde_json::from_value(value).map_err(|source| StoreError::Corrupt {
                key: key.to_owned(),
                source,
            }),
            None => Ok(T::default()),
        }
    }

    fn encode<T: Serialize>(key: &str, value: &T) -> Result<(String, Value), StoreError> {
        let value = serde_json::to_value(value).map_err(|source| StoreError::Serialization {
            key: key.to_owned(),
            source,
        })?;
        Ok((key.to_owned(), value))
    }

    pub async fn all_published(&self) -> Result<PublishedMap, StoreError> {
        self.load(PUBLISHED_SCHEDULE_KEY).await
    }

    pub async fn all_history(&self) -> Result<MonthHistory, StoreError> {
        self.load(SCHEDULE_HISTORY_KEY).await
    }

    pub async fn find_current(
        &self,
        month: MonthKey,
    ) -> Result<Option<PublishedMonthSnapshot>, StoreError> {
        let mut published = self.all_published().await?;
        Ok(published.remove(&month))
    }

    /// 公開中の月 (昇順)
    pub async fn published_months(&self) -> Result<Vec<MonthKey>, StoreError> {
        Ok(self.all_published().await?.into_keys().collect())
    }

    /// 指定月の過去バージョン (新しい順)
    pub async fn history(&self, month: MonthKey) -> Result<Vec<PublishedMonthSnapshot>, StoreError> {
        let mut history = self.all_history().await?;
        Ok(history.remove(&month).unwrap_or_default())
    }

    /// 公開中または履歴のある月 (新しい月が先)
    pub async fn months_with_versions(&self) -> Result<Vec<MonthKey>, StoreError> {
        let mut months: Vec<MonthKey> = self.published_months().await?;
        months.extend(
            self.all_history()
                .await?
                .into_iter()
                .filter(|(_, versions)| !versions.is_empty())
                .map(|(month, _)| month),
        );
        months.sort_unstable_by(|a, b| b.cmp(a));
        months.dedup();
        Ok(months)
    }

    pub async fn find_version(
        &self,
        month: MonthKey,
        version: VersionRef,
    ) -> Result<Option<PublishedMonthSnapshot>, StoreError> {
        match version {
            VersionRef::Current => self.find_current(month).await,
            VersionRef::History(index) => {
                let mut history = self.history(month).await?;
                Ok((index < history.len()).then(|| history.swap_remove(index)))
            }
        }
    }

    // =====================
    // 書き込み
    // =====================

    /// 指定月を公開する
    ///
    /// 1. 既に公開中のスナップショットがあれば履歴の先頭に移す (上限を超えた古いものは捨てる)
    /// 2. 前のバージョン番号 + 1 で新しいスナップショットを作る
    /// 3. 履歴 → 公開中の順に1回の書き込みで保存する
    ///
    /// 他の月には触れない
    pub async fn publish(
        &self,
        month: MonthKey,
        events: Vec<ShiftRecord>,
        month_name: &str,
    ) -> Result<PublishedMonthSnapshot, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut published = self.all_published().await?;
        let mut history = self.all_history().await?;

        let previous = published.remove(&month);
        let snapshot = PublishedMonthSnapshot::next_version(
            previous.as_ref(),
            month,
            month_name,
            events,
            Utc::now(),
        );

        let mut entries = Vec::with_capacity(2);
        if let Some(previous) = previous {
            tracing::debug!(
                month = %month,
                archived = %previous.version,
                "archiving previous version"
            );
            let versions = history.entry(month).or_default();
            versions.insert(0, previous);
            versions.truncate(self.history_limit);
            entries.push(Self::encode(SCHEDULE_HISTORY_KEY, &history)?);
        }

        published.insert(month, snapshot.clone());
        entries.push(Self::encode(PUBLISHED_SCHEDULE_KEY, &published)?);

        self.store.set_many(entries).await?;

        tracing::info!(
            month = %month,
            version = %snapshot.version,
            events = snapshot.events.len(),
            "published schedule"
        );
        Ok(snapshot)
    }

    /// 公開中・履歴の両方を削除する
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.store
            .remove_many(&[PUBLISHED_SCHEDULE_KEY, SCHEDULE_HISTORY_KEY])
            .await?;
        tracing::warn!("all published schedules and history were removed");
        Ok(())
    }
}
