use std::collections::{BTreeSet, HashSet};

use crate::domain::schedule_model::{MonthKey, PublishedMonthSnapshot};
use crate::domain::shift_record::{ShiftRecord, ShiftUpdate};

/// 編集中のシフトデータ (全ての月をまとめて保持する)
///
/// 月ごとに分割はせず、月の表示は日付での絞り込みで行う。
/// 編集結果は日付をキーにしてこのバッファへ書き戻す
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditingBuffer {
    records: Vec<ShiftRecord>,
}

impl EditingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ShiftRecord>) -> Self {
        Self { records }
    }

    /// 公開中のスナップショットを全部つなげて編集の出発点にする
    pub fn from_published<'a, I>(snapshots: I) -> Self
    where
        I: IntoIterator<Item = &'a PublishedMonthSnapshot>,
    {
        let records = snapshots
            .into_iter()
            .flat_map(|snapshot| snapshot.events.iter().cloned())
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[ShiftRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, date: &str) -> Option<&ShiftRecord> {
        self.records.iter().find(|record| record.date == date)
    }

    /// 指定した月のレコードだけを取り出す (コピー)
    pub fn month_records(&self, month: MonthKey) -> Vec<ShiftRecord> {
        self.records
            .iter()
            .filter(|record| month.contains(&record.date))
            .cloned()
            .collect()
    }

    /// バッファに含まれる月 (昇順, 重複なし)
    pub fn months(&self) -> Vec<MonthKey> {
        self.records
            .iter()
            .filter_map(ShiftRecord::month_key)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 既存のレコードがあれば指定フィールドだけ更新し、なければ新しく作る
    pub fn update_event(&mut self, date: &str, update: &ShiftUpdate) {
        match self.records.iter_mut().find(|record| record.date == date) {
            Some(record) => update.apply_to(record),
            None => self.records.push(update.clone().into_record(date)),
        }
    }

    /// 取得したデータのうち対象月の分だけを取り込む
    ///
    /// 1. fetched を対象月の日付に絞る (同じ日付が複数あれば後の行を採用)
    /// 2. 同じ日付のレコードをバッファから取り除く (フィールド単位のマージはしない)
    /// 3. 残りと新しいレコードをつなげて日付順に並べる
    ///
    /// 対象月以外のレコードには触れない。取り込んだ件数を返す。
    /// 対象月のデータが1件もなければバッファは変更しない
    pub fn import_month(&mut self, month: MonthKey, fetched: Vec<ShiftRecord>) -> usize {
        let mut seen = HashSet::new();
        let mut month_records: Vec<ShiftRecord> = fetched
            .into_iter()
            .rev()
            .filter(|record| month.contains(&record.date) && seen.insert(record.date.clone()))
            .collect();
        month_records.reverse();

        if month_records.is_empty() {
            return 0;
        }

        let incoming_dates: HashSet<&str> =
            month_records.iter().map(|record| record.date.as_str()).collect();
        self.records
            .retain(|record| !incoming_dates.contains(record.date.as_str()));

        let imported = month_records.len();
        self.records.extend(month_records);
        self.records.sort_by(|a, b| a.date.cmp(&b.date));
        imported
    }
}
