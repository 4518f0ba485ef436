use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use crate::domain::shift_record::{ShiftRecord, StaffList};
use crate::domain::time;
use crate::error::FetchError;

/// スプレッドシートの1行 (セルは全て文字列として扱う)
pub type RawRow = Vec<String>;

// --- 列の位置 (0 始まり) ---
pub const DATE_COLUMN: usize = 0;
pub const EXTRA_SHIFT_COLUMN: usize = 15;
pub const DAY_SHIFT_COLUMN: usize = 16;
pub const NIGHT_SHIFT_COLUMN: usize = 17;
pub const SCHOOL_COLUMN: usize = 18;
pub const OFF_COLUMN: usize = 19;

/// 行データの取得元 (Google Sheets, JSON ファイルなど)
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, FetchError>;
}

/// JSON のセル値を文字列にする (数値なども表示どおりの文字列に)
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn rows_from_json(values: &[Vec<Value>]) -> Vec<RawRow> {
    values
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect()
}

const ISO_FORMAT: &str = "%Y-%m-%d";

const DATE_FORMATS: [&str; 5] = [
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
];

/// 2桁の年を西暦に直す (0-49 -> 2000 年代, 50-99 -> 1900 年代)
fn expand_short_year(date: NaiveDate) -> Option<NaiveDate> {
    match date.year() {
        0..=49 => date.with_year(date.year() + 2000),
        50..=99 => date.with_year(date.year() + 1900),
        _ => Some(date),
    }
}

/// 日付セルを読む。ISO を試し、次に決まった書式を順に、
/// 最後に M/D/YYYY を数値で分解する。ISO 以外の 2桁の年は西暦に直す
pub fn parse_sheet_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, ISO_FORMAT) {
        return Some(date);
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
    {
        return expand_short_year(date);
    }

    let mut parts = raw.split('/').map(str::trim);
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let date =
        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
    expand_short_year(date)
}

fn cell(row: &[String], column: usize) -> &str {
    row.get(column).map(String::as_str).unwrap_or("")
}

/// 1行をシフト記録にする。日付が空または読めない行は None
pub fn row_to_record(row: &[String]) -> Option<ShiftRecord> {
    let date = parse_sheet_date(cell(row, DATE_COLUMN))?;

    let mut record = ShiftRecord::new(time::to_iso(date));
    record.extra_shift = StaffList::parse(cell(row, EXTRA_SHIFT_COLUMN));
    record.day_shift = StaffList::parse(cell(row, DAY_SHIFT_COLUMN));
    record.night_shift = StaffList::parse(cell(row, NIGHT_SHIFT_COLUMN));
    record.school = StaffList::parse(cell(row, SCHOOL_COLUMN));
    record.off = StaffList::parse(cell(row, OFF_COLUMN));
    Some(record)
}

/// 全行を変換する。読めない行は飛ばす
pub fn parse_rows(rows: &[RawRow]) -> Vec<ShiftRecord> {
    let records: Vec<ShiftRecord> = rows.iter().filter_map(|row| row_to_record(row)).collect();
    let skipped = rows.len() - records.len();
    if skipped > 0 {
        tracing::debug!(skipped, "rows without a readable date were skipped");
    }
    records
}

// =====================
// 取得元の実装
// =====================

/// 固定の行データを返す
#[derive(Debug, Clone, Default)]
pub struct StaticRowSource {
    rows: Vec<RawRow>,
}

impl StaticRowSource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl RowSource for StaticRowSource {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, FetchError> {
        Ok(self.rows.clone())
    }
}

/// `[["1/5/2025", ...], ...]` 形式の JSON ファイルから読む
/// (Sheets API の `{"values": [...]}` 形式もそのまま読める)
#[derive(Debug, Clone)]
pub struct JsonFileRowSource {
    path: PathBuf,
}

impl JsonFileRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RowSource for JsonFileRowSource {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, FetchError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;

        let values = match serde_json::from_str::<Value>(&text)? {
            Value::Object(mut body) => body.remove("values").unwrap_or(Value::Array(vec![])),
            other => other,
        };
        let values: Vec<Vec<Value>> = serde_json::from_value(values)?;
        Ok(rows_from_json(&values))
    }
}
