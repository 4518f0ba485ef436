pub mod recording_surface;
pub mod show_output;

use schedule_manager_lib::infrastructure::row_source::{
    RawRow, DATE_COLUMN, DAY_SHIFT_COLUMN, EXTRA_SHIFT_COLUMN, NIGHT_SHIFT_COLUMN, OFF_COLUMN,
    SCHOOL_COLUMN,
};

/// スプレッドシートと同じ並び (20列) の行を作る
pub fn sheet_row(date: &str, extra: &str, day: &str, night: &str, school: &str, off: &str) -> RawRow {
    let mut row = vec![String::new(); OFF_COLUMN + 1];
    row[DATE_COLUMN] = date.to_owned();
    row[EXTRA_SHIFT_COLUMN] = extra.to_owned();
    row[DAY_SHIFT_COLUMN] = day.to_owned();
    row[NIGHT_SHIFT_COLUMN] = night.to_owned();
    row[SCHOOL_COLUMN] = school.to_owned();
    row[OFF_COLUMN] = off.to_owned();
    row
}
