use std::collections::HashSet;

use serde::Serialize;

use crate::domain::shift_record::{BackgroundColor, ShiftRecord, StaffList};
use crate::domain::time;

/// 人員不足 (赤)
pub const COLOR_CRITICAL: &str = "#ff6b6b";
/// あと1人不足 (緑)
pub const COLOR_UNDERSTAFFED_BY_ONE: &str = "#51cf66";
/// 充足 / データなし (灰)
pub const COLOR_NEUTRAL: &str = "#adb5bd";

/// 1日分の人員充足の判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Critical,
    UnderstaffedByOne,
    FullyStaffed,
    NoData,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::UnderstaffedByOne => "understaffed-by-one",
            Self::FullyStaffed => "fully-staffed",
            Self::NoData => "no-data",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Critical => COLOR_CRITICAL,
            Self::UnderstaffedByOne => COLOR_UNDERSTAFFED_BY_ONE,
            Self::FullyStaffed | Self::NoData => COLOR_NEUTRAL,
        }
    }
}

/// 平日判定でどの条件に一致したか
///
/// `Fallback` は critical の条件が先に評価されるため到達しないはずの分岐。
/// テストで到達不能であることを確認している
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekdayRule {
    Critical,
    UnderstaffedByOne,
    FullyStaffed,
    Fallback,
}

impl WeekdayRule {
    pub fn classification(self) -> Classification {
        match self {
            Self::Critical => Classification::Critical,
            Self::UnderstaffedByOne => Classification::UnderstaffedByOne,
            Self::FullyStaffed | Self::Fallback => Classification::FullyStaffed,
        }
    }
}

/// 平日の判定。上から順に最初に一致したものを採用する
/// (day <= 2 / night == 0 / day == 3 && night == 1 は critical)
pub fn weekday_rule(day_count: usize, night_count: usize) -> WeekdayRule {
    if day_count <= 2 || night_count == 0 || (day_count == 3 && night_count == 1) {
        WeekdayRule::Critical
    } else if (day_count == 3 && night_count >= 2) || (day_count >= 4 && night_count == 1) {
        WeekdayRule::UnderstaffedByOne
    } else if day_count >= 4 && night_count >= 2 {
        WeekdayRule::FullyStaffed
    } else {
        WeekdayRule::Fallback
    }
}

/// 土日の判定。2人以上で充足、1人で critical
///
/// 0人の場合も fully-staffed になる (平日の no-data とは扱いが違う)
pub fn weekend_classification(total_staff: usize) -> Classification {
    match total_staff {
        1 => Classification::Critical,
        _ => Classification::FullyStaffed,
    }
}

fn head_count(slot: Option<&StaffList>) -> usize {
    slot.map_or(0, StaffList::head_count)
}

/// 日勤・夜勤の人数から充足度を判定する。extra / school / off は数えない
pub fn classify(record: &ShiftRecord) -> Classification {
    if record.day_shift.is_none() && record.night_shift.is_none() && record.extra_shift.is_none() {
        return Classification::NoData;
    }

    let day_count = head_count(record.day_shift.as_ref());
    let night_count = head_count(record.night_shift.as_ref());

    if time::is_weekend(&record.date) {
        weekend_classification(day_count + night_count)
    } else {
        weekday_rule(day_count, night_count).classification()
    }
}

/// 表示色。明示的な指定があればそれを優先する
pub fn resolve_color(record: &ShiftRecord) -> String {
    match &record.background_color {
        BackgroundColor::Auto => classify(record).color().to_owned(),
        BackgroundColor::Explicit(color) => color.clone(),
    }
}

/// extra / day / night を通して同じ人が2回以上出てくるか
pub fn has_double_shift(record: &ShiftRecord) -> bool {
    let mut seen = HashSet::new();
    record
        .duty_slots()
        .into_iter()
        .flatten()
        .flat_map(StaffList::staff)
        .any(|initials| !seen.insert(initials))
}

/// 重複割り当て (エラー) の検出。現状は [`has_double_shift`] と同じ条件
pub fn has_duplicate_assignments(record: &ShiftRecord) -> bool {
    has_double_shift(record)
}

/// 5フィールド全体のスタッフ (重複なし, 初出順)
pub fn unique_staff(record: &ShiftRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    record
        .all_slots()
        .into_iter()
        .flatten()
        .flat_map(StaffList::staff)
        .filter(|initials| seen.insert(*initials))
        .map(str::to_owned)
        .collect()
}

/// 描画前に1日分をまとめて評価した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffingEvaluation {
    pub classification: Classification,
    /// 明示指定を反映した最終的な色
    pub color: String,
    pub has_double_shift: bool,
    pub has_duplicate_assignments: bool,
    pub is_changed_from_previous: bool,
}

pub fn evaluate(record: &ShiftRecord, changed_dates: &HashSet<String>) -> StaffingEvaluation {
    StaffingEvaluation {
        classification: classify(record),
        color: resolve_color(record),
        has_double_shift: has_double_shift(record),
        has_duplicate_assignments: has_duplicate_assignments(record),
        is_changed_from_previous: changed_dates.contains(&record.date),
    }
}
