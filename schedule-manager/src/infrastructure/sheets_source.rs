use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::config::SheetConfig;
use crate::error::FetchError;
use crate::infrastructure::row_source::{rows_from_json, RawRow, RowSource};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Sheets API `values.get` のレスポンス (使う部分だけ)
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Google Sheets API (API キー認証) から行を取得する。
/// 失敗した場合はリトライせずにそのままエラーを返す
pub struct SheetsRowSource {
    client: reqwest::Client,
    config: SheetConfig,
    base_url: String,
}

impl SheetsRowSource {
    pub fn new(config: SheetConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            base_url: SHEETS_API_BASE.to_owned(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `{base}/{sheet_id}/values/{range}?key={api_key}`
    pub fn values_url(&self) -> Result<Url, FetchError> {
        let invalid = || FetchError::InvalidUrl(self.base_url.clone());

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend([
                self.config.sheet_id.as_str(),
                "values",
                self.config.range.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key);
        Ok(url)
    }
}

#[async_trait]
impl RowSource for SheetsRowSource {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, FetchError> {
        let url = self.values_url()?;
        tracing::debug!(sheet_id = %self.config.sheet_id, range = %self.config.range, "fetching sheet rows");

        let body: ValueRange = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::info!(rows = body.values.len(), "fetched sheet rows");
        Ok(rows_from_json(&body.values))
    }
}
