use crate::domain::schedule_model::DEFAULT_HISTORY_LIMIT;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://schedule.db";
pub const DEFAULT_SHEET_RANGE: &str = "Sheet2!A13:X100";

/// Google Sheets から行データを取得するための設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetConfig {
    pub api_key: String,
    pub sheet_id: String,
    /// 例: "Sheet2!A13:X100"
    pub range: String,
}

impl SheetConfig {
    pub fn new(api_key: impl Into<String>, sheet_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            sheet_id: sheet_id.into(),
            range: DEFAULT_SHEET_RANGE.to_owned(),
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// sqlx の接続文字列 (例: "sqlite://schedule.db", "sqlite::memory:")
    pub database_url: String,
    /// 月ごとに残す過去バージョンの数
    pub history_limit: usize,
    /// None の場合は Google Sheets からの取り込みを使わない
    pub sheet: Option<SheetConfig>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            sheet: None,
        }
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScheduleConfig::default();
        assert_eq!(config.database_url, "sqlite://schedule.db");
        assert_eq!(config.history_limit, 20);
        assert!(config.sheet.is_none());

        let sheet = SheetConfig::new("key", "sheet");
        assert_eq!(sheet.range, "Sheet2!A13:X100");
        assert_eq!(sheet.with_range("Sheet1!A1:T50").range, "Sheet1!A1:T50");
    }
}
