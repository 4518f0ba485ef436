use chrono::NaiveDate;
use schedule_manager_lib::application::calendar_surface::CalendarSurface;
use schedule_manager_lib::application::dto::{CalendarEventDto, HistoryListing};
use schedule_manager_lib::domain::time;

/// 評価済みイベントを標準出力に表として出す
pub struct TableSurface {
    title: String,
    events: Vec<CalendarEventDto>,
}

impl TableSurface {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            events: Vec::new(),
        }
    }
}

fn weekday_label(date: &str) -> &'static str {
    if time::is_weekend(date) {
        "週末"
    } else {
        "平日"
    }
}

impl CalendarSurface for TableSurface {
    fn render(&mut self, events: &[CalendarEventDto]) {
        self.events = events.to_vec();

        println!("\n=======================================================");
        println!("🗓️ {} (計 {} 日)", self.title, events.len());
        println!("=======================================================");

        for event in events {
            let props = &event.extended_props;
            println!(
                "{} {} | [+1] {:<8} [日勤] {:<15} [夜勤] {:<10} [学校] {:<6} [休] {:<8} | {:<19} {} {}",
                event.start,
                weekday_label(&event.start),
                props.extra_shift,
                props.day_shift,
                props.night_shift,
                props.school,
                props.off,
                event.classification.as_str(),
                event.background_color,
                event.class_names.join(" ")
            );
        }
    }

    fn goto_date(&mut self, date: NaiveDate) {
        println!("-------------------------------------------------------");
        println!("📅 表示月: {}", date.format("%B %Y"));
        println!("=======================================================\n");
    }

    fn events(&self) -> &[CalendarEventDto] {
        &self.events
    }

    fn destroy(&mut self) {
        self.events.clear();
    }
}

pub fn show_history(listing: &HistoryListing) {
    println!("\n=======================================================");
    println!("📋 履歴: {}", listing.month_key);
    println!("=======================================================");
    match &listing.current {
        Some(current) => println!(
            "   現在: {} ({} 日, {})",
            current.version, current.event_count, current.published_at
        ),
        None => println!("   現在: (未公開)"),
    }
    if listing.history.is_empty() {
        println!("   (過去のバージョンなし)");
    }
    for (index, summary) in listing.history.iter().enumerate() {
        println!(
            "   ┣ [{}] {} ({} 日, {})",
            index, summary.version, summary.event_count, summary.published_at
        );
    }
    println!("=======================================================\n");
}
