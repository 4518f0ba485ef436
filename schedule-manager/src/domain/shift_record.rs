// =====================
// シフト記録 (1日分) のドメインモデル
// =====================

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::schedule_model::MonthKey;

/// 永続化 JSON 上で「未設定」を表す値
pub const UNSET: &str = "_";
/// スプレッドシート上の空欄を表す値
pub const BLANK: &str = "Blank";
/// 背景色を staffing から自動計算することを表す値
pub const AUTO_COLOR: &str = "auto";

/// スプレッドシートやフォームから来た生の値を正規化する
///
/// - 空文字 / 空白のみ -> `"_"`
/// - `"Blank"` そのもの -> `"_"`
/// - `/` を含む場合は各要素を trim し、`"Blank"` を空文字に置き換えて再結合する
///
/// 最後のルールは空になったスロットを削除しない。
/// `"A/Blank/B"` は `"A//B"` になる (スロットの位置を保つ)
pub fn normalize_shift_value(raw: &str) -> String {
    if raw.trim().is_empty() || raw == BLANK {
        return UNSET.to_owned();
    }

    if raw.contains('/') {
        return raw
            .split('/')
            .map(|part| {
                let part = part.trim();
                if part == BLANK { "" } else { part }
            })
            .collect::<Vec<_>>()
            .join("/");
    }

    raw.to_owned()
}

/// `/` 区切りのスタッフイニシャル列
///
/// 正規化後のスロット構造をそのまま保持するので、空スロットも残る。
/// 人数の計算には [`StaffList::staff`] を使う
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffList {
    slots: Vec<String>,
}

impl StaffList {
    /// 生の値を正規化して読み込む。未設定なら None
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_shift_value(raw);
        if normalized == UNSET {
            return None;
        }
        Some(Self {
            slots: normalized.split('/').map(str::to_owned).collect(),
        })
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// 空スロットと "Blank" を除いた実際のスタッフ
    pub fn staff(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .map(|slot| slot.trim())
            .filter(|slot| !slot.is_empty() && *slot != BLANK)
    }

    pub fn head_count(&self) -> usize {
        self.staff().count()
    }

    pub fn join(&self) -> String {
        self.slots.join("/")
    }
}

impl fmt::Display for StaffList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

/// 背景色の指定。`Auto` の場合は staffing から色を決める
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackgroundColor {
    #[default]
    Auto,
    Explicit(String),
}

impl BackgroundColor {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == AUTO_COLOR {
            Self::Auto
        } else {
            Self::Explicit(raw.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => AUTO_COLOR,
            Self::Explicit(color) => color,
        }
    }
}

impl Serialize for BackgroundColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BackgroundColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}

/// `Option<StaffList>` <-> `"_"` 文字列の変換 (永続化 JSON 用)
mod slot_sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{StaffList, UNSET};

    pub fn serialize<S: Serializer>(
        slot: &Option<StaffList>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match slot {
            Some(list) => serializer.serialize_str(&list.join()),
            None => serializer.serialize_str(UNSET),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<StaffList>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(StaffList::parse))
    }
}

/// 1日分のシフト割り当て
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    /// "YYYY-MM-DD"。月内で一意のキー
    #[serde(rename = "start", alias = "date")]
    pub date: String,

    #[serde(default, with = "slot_sentinel")]
    pub extra_shift: Option<StaffList>,
    #[serde(default, with = "slot_sentinel")]
    pub day_shift: Option<StaffList>,
    #[serde(default, with = "slot_sentinel")]
    pub night_shift: Option<StaffList>,
    #[serde(default, with = "slot_sentinel")]
    pub school: Option<StaffList>,
    #[serde(default, with = "slot_sentinel")]
    pub off: Option<StaffList>,

    #[serde(default)]
    pub background_color: BackgroundColor,
}

impl ShiftRecord {
    /// 割り当てなしのレコード (全て "_", 色は auto)
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            extra_shift: None,
            day_shift: None,
            night_shift: None,
            school: None,
            off: None,
            background_color: BackgroundColor::Auto,
        }
    }

    /// 勤務に数えるシフト (extra, day, night)
    pub fn duty_slots(&self) -> [Option<&StaffList>; 3] {
        [
            self.extra_shift.as_ref(),
            self.day_shift.as_ref(),
            self.night_shift.as_ref(),
        ]
    }

    /// school / off を含む全フィールド
    pub fn all_slots(&self) -> [Option<&StaffList>; 5] {
        [
            self.extra_shift.as_ref(),
            self.day_shift.as_ref(),
            self.night_shift.as_ref(),
            self.school.as_ref(),
            self.off.as_ref(),
        ]
    }

    pub fn month_key(&self) -> Option<MonthKey> {
        MonthKey::of_date(&self.date)
    }
}

/// 編集フォームからの部分更新。指定されたフィールドだけを上書きする
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftUpdate {
    pub extra_shift: Option<String>,
    pub day_shift: Option<String>,
    pub night_shift: Option<String>,
    pub school: Option<String>,
    pub off: Option<String>,
    pub background_color: Option<String>,
}

impl ShiftUpdate {
    pub fn apply_to(&self, record: &mut ShiftRecord) {
        let fields = [
            (&self.extra_shift, &mut record.extra_shift),
            (&self.day_shift, &mut record.day_shift),
            (&self.night_shift, &mut record.night_shift),
            (&self.school, &mut record.school),
            (&self.off, &mut record.off),
        ];
        for (update, slot) in fields {
            if let Some(raw) = update {
                *slot = StaffList::parse(raw);
            }
        }

        if let Some(color) = &self.background_color {
            record.background_color = BackgroundColor::parse(color);
        }
    }

    /// 未指定のフィールドは "_" / auto で新しいレコードを作る
    pub fn into_record(self, date: impl Into<String>) -> ShiftRecord {
        let mut record = ShiftRecord::new(date);
        self.apply_to(&mut record);
        record
    }
}
