use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::application::dto::CalendarEventDto;
use crate::domain::schedule_model::MonthKey;

/// カレンダーの表示先 (画面ごとに1つ)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CalendarSlot {
    Published,
    SupervisorView,
    SupervisorEdit,
    Version,
    History,
    Account,
}

impl CalendarSlot {
    pub const ALL: [Self; 6] = [
        Self::Published,
        Self::SupervisorView,
        Self::SupervisorEdit,
        Self::Version,
        Self::History,
        Self::Account,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::SupervisorView => "supervisor-view",
            Self::SupervisorEdit => "supervisor-edit",
            Self::Version => "version",
            Self::History => "history",
            Self::Account => "account",
        }
    }
}

impl fmt::Display for CalendarSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 評価済みイベントを描画する側 (UI, CLI の表など)
///
/// 色や class name はこちらで計算済みのものを渡すので、描画側は判定をしない
pub trait CalendarSurface: Send {
    fn render(&mut self, events: &[CalendarEventDto]);
    fn goto_date(&mut self, date: NaiveDate);
    fn events(&self) -> &[CalendarEventDto];
    fn destroy(&mut self);
}

/// 表示先ごとのカレンダーを保持する
///
/// 同じ表示先に新しいカレンダーを登録すると、古い方は destroy してから置き換える
#[derive(Default)]
pub struct CalendarRegistry {
    surfaces: BTreeMap<CalendarSlot, Box<dyn CalendarSurface>>,
}

impl CalendarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, slot: CalendarSlot, surface: Box<dyn CalendarSurface>) {
        if let Some(mut previous) = self.surfaces.insert(slot, surface) {
            previous.destroy();
        }
    }

    pub fn get(&self, slot: CalendarSlot) -> Option<&dyn CalendarSurface> {
        self.surfaces.get(&slot).map(|surface| surface.as_ref())
    }

    pub fn is_initialized(&self, slot: CalendarSlot) -> bool {
        self.surfaces.contains_key(&slot)
    }

    /// 登録されていれば destroy して外す
    pub fn destroy(&mut self, slot: CalendarSlot) -> bool {
        match self.surfaces.remove(&slot) {
            Some(mut surface) => {
                surface.destroy();
                true
            }
            None => false,
        }
    }

    pub fn destroy_all(&mut self) {
        for (_, mut surface) in std::mem::take(&mut self.surfaces) {
            surface.destroy();
        }
    }

    /// イベントを描画してその月の1日に移動する。表示先が未登録なら false
    pub fn show_month(
        &mut self,
        slot: CalendarSlot,
        month: MonthKey,
        events: &[CalendarEventDto],
    ) -> bool {
        let Some(surface) = self.surfaces.get_mut(&slot) else {
            tracing::debug!(slot = %slot, "calendar not initialized, nothing to show");
            return false;
        };

        surface.render(events);
        if let Some(first) = month.first_day() {
            surface.goto_date(first);
        }
        true
    }
}
