use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::schedule_model::{MonthKey, PublishedMonthSnapshot};
use crate::domain::shift_record::{ShiftRecord, StaffList, UNSET};
use crate::domain::staffing_logic::{self, Classification};

pub const CLASS_CHANGED: &str = "event-changed";
pub const CLASS_DUPLICATE: &str = "event-duplicate";
pub const CLASS_DOUBLE_SHIFT: &str = "event-double-shift";

/// カレンダー表示用のシフト内容 ("_" = 未設定)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPropsDto {
    pub extra_shift: String,
    pub day_shift: String,
    pub night_shift: String,
    pub school: String,
    pub off: String,
}

fn slot_text(slot: Option<&StaffList>) -> String {
    slot.map_or_else(|| UNSET.to_owned(), StaffList::join)
}

impl From<&ShiftRecord> for ShiftPropsDto {
    fn from(record: &ShiftRecord) -> Self {
        Self {
            extra_shift: slot_text(record.extra_shift.as_ref()),
            day_shift: slot_text(record.day_shift.as_ref()),
            night_shift: slot_text(record.night_shift.as_ref()),
            school: slot_text(record.school.as_ref()),
            off: slot_text(record.off.as_ref()),
        }
    }
}

/// 評価済みの1日分 (カレンダーにそのまま渡す)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventDto {
    pub id: String,
    pub start: String,
    pub all_day: bool,
    pub background_color: String,
    pub border_color: String,
    pub classification: Classification,
    pub extended_props: ShiftPropsDto,
    pub class_names: Vec<String>,
}

impl CalendarEventDto {
    pub fn from_record(index: usize, record: &ShiftRecord, changed: &HashSet<String>) -> Self {
        let evaluation = staffing_logic::evaluate(record, changed);

        // 優先順: 変更あり > 重複 > 二重勤務 (どれか1つだけ付ける)
        let class_name = if evaluation.is_changed_from_previous {
            Some(CLASS_CHANGED)
        } else if evaluation.has_duplicate_assignments {
            Some(CLASS_DUPLICATE)
        } else if evaluation.has_double_shift {
            Some(CLASS_DOUBLE_SHIFT)
        } else {
            None
        };

        Self {
            id: format!("event-{index}"),
            start: record.date.clone(),
            all_day: true,
            border_color: evaluation.color.clone(),
            background_color: evaluation.color,
            classification: evaluation.classification,
            extended_props: ShiftPropsDto::from(record),
            class_names: class_name.into_iter().map(str::to_owned).collect(),
        }
    }
}

pub fn to_calendar_events(
    records: &[ShiftRecord],
    changed: &HashSet<String>,
) -> Vec<CalendarEventDto> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| CalendarEventDto::from_record(index, record, changed))
        .collect()
}

/// 1ヶ月分の表示データ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    pub month_key: MonthKey,
    pub label: String,
    /// 公開済みの場合のバージョン表示 (編集中なら None)
    pub version: Option<String>,
    pub events: Vec<CalendarEventDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub version: String,
    pub version_number: u32,
    pub published_at: DateTime<Utc>,
    pub event_count: usize,
}

impl From<&PublishedMonthSnapshot> for VersionSummary {
    fn from(snapshot: &PublishedMonthSnapshot) -> Self {
        Self {
            version: snapshot.version.clone(),
            version_number: snapshot.version_number,
            published_at: snapshot.published_at,
            event_count: snapshot.events.len(),
        }
    }
}

/// 履歴画面の一覧 (現在のバージョン + 過去のバージョン, 新しい順)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryListing {
    pub month_key: MonthKey,
    pub current: Option<VersionSummary>,
    pub history: Vec<VersionSummary>,
}

/// 特定のバージョンの表示データ。前のバージョンから変わった日付も含む
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionView {
    pub month_key: MonthKey,
    pub summary: VersionSummary,
    pub changed_dates: Vec<String>,
    pub events: Vec<CalendarEventDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub month_key: MonthKey,
    /// 取り込んだ対象月の日数
    pub imported: usize,
    /// 取り込み後のバッファ全体の件数
    pub buffered: usize,
}
