use std::collections::HashSet;

use crate::application::calendar_surface::{CalendarRegistry, CalendarSlot};
use crate::application::dto::{
    to_calendar_events, HistoryListing, ImportSummary, MonthView, VersionSummary, VersionView,
};
use crate::domain::editing_buffer::EditingBuffer;
use crate::domain::schedule_model::{
    changed_dates, MonthKey, PublishedMonthSnapshot, VersionRef,
};
use crate::error::{CommandError, StoreError};
use crate::infrastructure::row_source::{parse_rows, RowSource};
use crate::ScheduleServices;

/// 読み込みの失敗は「データなし」として扱う (ログだけ残す)
fn or_no_data<T: Default>(result: Result<T, StoreError>, operation: &'static str) -> T {
    result.unwrap_or_else(|error| {
        tracing::error!(%error, operation, "schedule store read failed, treating as no data");
        T::default()
    })
}

// --- Editing ---

/// 公開中の全ての月から編集バッファを作り直す
pub async fn load_editing_buffer(services: &ScheduleServices) -> EditingBuffer {
    let published = or_no_data(services.schedule.all_published().await, "load_editing_buffer");
    let buffer = EditingBuffer::from_published(published.values());
    tracing::debug!(records = buffer.len(), "editing buffer loaded");
    buffer
}

/// 編集画面用: バッファから1ヶ月分を取り出して評価する
pub fn edit_month_view(buffer: &EditingBuffer, month: MonthKey) -> MonthView {
    let records = buffer.month_records(month);
    MonthView {
        month_key: month,
        label: month.label(),
        version: None,
        events: to_calendar_events(&records, &HashSet::new()),
    }
}

/// 取り込み: 取得元の全行を読み、対象月の分だけをバッファに反映する
///
/// 取得元が空、または対象月の行がない場合はバッファを変更せずにエラーを返す
pub async fn import_month(
    source: &dyn RowSource,
    buffer: &mut EditingBuffer,
    month: MonthKey,
) -> Result<ImportSummary, CommandError> {
    let rows = source.fetch_rows().await?;
    if rows.is_empty() {
        tracing::warn!(month = %month, "row source returned no rows");
        return Err(CommandError::EmptySource);
    }

    let imported = buffer.import_month(month, parse_rows(&rows));
    if imported == 0 {
        tracing::warn!(month = %month, rows = rows.len(), "no rows for the requested month");
        return Err(CommandError::NoEventsForMonth(month));
    }

    tracing::info!(month = %month, imported, "imported month into editing buffer");
    Ok(ImportSummary {
        month_key: month,
        imported,
        buffered: buffer.len(),
    })
}

// --- Publish ---

/// バッファ中の対象月を新しいバージョンとして公開する
pub async fn publish_month(
    services: &ScheduleServices,
    buffer: &EditingBuffer,
    month: MonthKey,
) -> Result<PublishedMonthSnapshot, CommandError> {
    let events = buffer.month_records(month);
    if events.is_empty() {
        return Err(CommandError::NoEventsForMonth(month));
    }

    let snapshot = services
        .schedule
        .publish(month, events, month.month_name())
        .await?;
    Ok(snapshot)
}

/// 公開画面用: 現在公開中のバージョン
pub async fn published_month_view(services: &ScheduleServices, month: MonthKey) -> Option<MonthView> {
    let snapshot = or_no_data(services.schedule.find_current(month).await, "published_month_view")?;
    Some(MonthView {
        month_key: month,
        label: month.label(),
        events: to_calendar_events(&snapshot.events, &HashSet::new()),
        version: Some(snapshot.version),
    })
}

pub async fn published_months(services: &ScheduleServices) -> Vec<MonthKey> {
    or_no_data(services.schedule.published_months().await, "published_months")
}

// --- History ---

/// 公開中または履歴のある月 (新しい順)
pub async fn history_months(services: &ScheduleServices) -> Vec<MonthKey> {
    or_no_data(services.schedule.months_with_versions().await, "history_months")
}

pub async fn history_listing(services: &ScheduleServices, month: MonthKey) -> HistoryListing {
    let current = or_no_data(services.schedule.find_current(month).await, "history_listing");
    let history = or_no_data(services.schedule.history(month).await, "history_listing");

    HistoryListing {
        month_key: month,
        current: current.as_ref().map(VersionSummary::from),
        history: history.iter().map(VersionSummary::from).collect(),
    }
}

/// 指定バージョンを表示用に評価する。
/// 1つ古いバージョンと比べて内容が変わった日付に印を付ける
pub async fn view_version(
    services: &ScheduleServices,
    month: MonthKey,
    version: VersionRef,
) -> Option<VersionView> {
    let current = or_no_data(services.schedule.find_current(month).await, "view_version");
    let mut history = or_no_data(services.schedule.history(month).await, "view_version");

    // history は新しい順なので、1つ古いものは index + 1
    let (target, previous) = match version {
        VersionRef::Current => (current?, history.first()),
        VersionRef::History(index) if index < history.len() => {
            let target = history.remove(index);
            (target, history.get(index))
        }
        VersionRef::History(_) => return None,
    };

    let changed = previous
        .map(|previous| changed_dates(&previous.events, &target.events))
        .unwrap_or_default();
    let highlighted: HashSet<String> = changed.iter().cloned().collect();

    Some(VersionView {
        month_key: month,
        summary: VersionSummary::from(&target),
        changed_dates: changed.into_iter().collect(),
        events: to_calendar_events(&target.events, &highlighted),
    })
}

/// 表示先のカレンダーに描画する。未登録なら false
pub fn show_in_surface(registry: &mut CalendarRegistry, slot: CalendarSlot, view: &MonthView) -> bool {
    registry.show_month(slot, view.month_key, &view.events)
}

// --- Danger zone ---

/// 公開中・履歴の全データを削除する。confirmed が false なら何もしない
pub async fn clear_all_schedule_data(
    services: &ScheduleServices,
    confirmed: bool,
) -> Result<(), CommandError> {
    if !confirmed {
        return Err(CommandError::NotConfirmed);
    }
    services.schedule.clear_all().await?;
    Ok(())
}
