// =====================
// 月単位の公開スケジュールモデル
// =====================

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::shift_record::ShiftRecord;
use crate::domain::time;

/// 月ごとに保持する履歴の上限
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// 扱える年の範囲 ("YYYY" の4桁に収まる範囲)
pub const MAX_YEAR: i32 = 9999;

/// "YYYY-MM" のパーティションキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32, // 1-12
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month key `{0}` (expected YYYY-MM)")]
pub struct MonthKeyParseError(String);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        ((0..=MAX_YEAR).contains(&year) && (1..=12).contains(&month))
            .then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// ISO 日付の先頭7文字 ("YYYY-MM") から月を求める
    pub fn of_date(iso: &str) -> Option<Self> {
        iso.get(..7).and_then(|prefix| prefix.parse().ok())
    }

    pub fn contains(&self, iso: &str) -> bool {
        Self::of_date(iso) == Some(*self)
    }

    /// 月名 (例: "January")
    pub fn month_name(&self) -> &'static str {
        // new() で 1-12 を保証しているので None にはならない
        time::month_name(self.month).unwrap_or_default()
    }

    /// 表示用ラベル (例: "January 2025")
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        time::month_bounds(self.year, self.month).map(|(first, _)| first)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        time::month_bounds(self.year, self.month).map(|(_, last)| last)
    }

    /// delta ヶ月ずらした月 (-1 で前月, +1 で翌月)。範囲外なら None
    pub fn offset(&self, delta: i32) -> Option<Self> {
        let index = (self.year * 12 + (self.month as i32 - 1)).checked_add(delta)?;
        Self::new(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MonthKeyParseError(s.to_owned());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = MonthKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// 公開済みの1ヶ月分のスナップショット。作成後は変更しない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedMonthSnapshot {
    /// 表示用ラベル (例: "March 3")
    pub version: String,
    pub version_number: u32,
    pub month_key: MonthKey,
    pub events: Vec<ShiftRecord>,
    pub published_at: DateTime<Utc>,
}

impl PublishedMonthSnapshot {
    /// 前のバージョンの次の番号でスナップショットを作る (初回は 1)
    pub fn next_version(
        previous: Option<&Self>,
        month_key: MonthKey,
        month_name: &str,
        events: Vec<ShiftRecord>,
        published_at: DateTime<Utc>,
    ) -> Self {
        let version_number = previous.map_or(1, |prev| prev.version_number + 1);
        Self {
            version: format!("{month_name} {version_number}"),
            version_number,
            month_key,
            events,
            published_at,
        }
    }
}

/// 現在公開中のスナップショット (月 -> スナップショット)
pub type PublishedMap = BTreeMap<MonthKey, PublishedMonthSnapshot>;

/// 過去バージョン (月 -> 新しい順のスナップショット列)
pub type MonthHistory = BTreeMap<MonthKey, Vec<PublishedMonthSnapshot>>;

/// 表示するバージョンの指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRef {
    Current,
    /// 履歴リストのインデックス (0 が最も新しい)
    History(usize),
}

/// 2つのスナップショット間で内容が変わった日付
///
/// 片方にしか存在しない日付も「変更あり」として扱う
pub fn changed_dates(previous: &[ShiftRecord], current: &[ShiftRecord]) -> BTreeSet<String> {
    let before: BTreeMap<&str, &ShiftRecord> =
        previous.iter().map(|r| (r.date.as_str(), r)).collect();
    let after: BTreeMap<&str, &ShiftRecord> =
        current.iter().map(|r| (r.date.as_str(), r)).collect();

    before
        .keys()
        .chain(after.keys())
        .filter(|date| before.get(*date) != after.get(*date))
        .map(|date| (*date).to_owned())
        .collect()
}
