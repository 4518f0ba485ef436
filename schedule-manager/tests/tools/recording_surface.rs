use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use schedule_manager_lib::application::calendar_surface::CalendarSurface;
use schedule_manager_lib::application::dto::CalendarEventDto;

/// 描画内容を記録するだけのカレンダー
#[derive(Default)]
pub struct RecordingSurface {
    events: Vec<CalendarEventDto>,
    pub current_date: Arc<Mutex<Option<NaiveDate>>>,
    pub destroyed: Arc<Mutex<bool>>,
}

impl CalendarSurface for RecordingSurface {
    fn render(&mut self, events: &[CalendarEventDto]) {
        self.events = events.to_vec();
    }

    fn goto_date(&mut self, date: NaiveDate) {
        *self.current_date.lock().unwrap() = Some(date);
    }

    fn events(&self) -> &[CalendarEventDto] {
        &self.events
    }

    fn destroy(&mut self) {
        *self.destroyed.lock().unwrap() = true;
    }
}
