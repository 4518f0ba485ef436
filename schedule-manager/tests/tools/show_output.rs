use schedule_manager_lib::application::dto::{CalendarEventDto, HistoryListing};

pub fn show_events_debug_data(title: &str, events: &[CalendarEventDto]) {
    println!("\n=======================================================");
    println!("🗓️ [DEBUG] {} (計 {} 日)", title, events.len());
    println!("=======================================================");

    for event in events {
        let props = &event.extended_props;
        println!(
            "   {} : [+1] {:<8} [日勤] {:<15} [夜勤] {:<10} {:?} {}",
            event.start,
            props.extra_shift,
            props.day_shift,
            props.night_shift,
            event.classification,
            event.class_names.join(" ")
        );
    }
    println!("=======================================================\n");
}

pub fn show_history_debug_data(listing: &HistoryListing) {
    println!("\n=======================================================");
    println!("📋 [DEBUG] 履歴 ({})", listing.month_key);
    println!("=======================================================");
    match &listing.current {
        Some(current) => println!("📅 現在: {} ({} 日)", current.version, current.event_count),
        None => println!("📅 現在: (未公開)"),
    }
    for (i, summary) in listing.history.iter().enumerate() {
        println!("   ┣ [{}] {} ({})", i, summary.version, summary.published_at);
    }
    println!("=======================================================\n");
}
