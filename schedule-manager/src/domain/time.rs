use chrono::{Datelike, NaiveDate, Weekday};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// 月名 (英語) を返す
/// ※ month: 1 (1月) 〜 12 (12月)
pub fn month_name(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES.get(index as usize))
        .copied()
}

/// 指定された年・月の日数を計算する
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    // 1. その月の1日を取得
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;

    // 2. 翌月の1日を取得して差分を取る
    // month が 12 (12月) の場合は翌年の1月
    let next_month_date = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    let days = next_month_date.signed_duration_since(first_day).num_days();
    u32::try_from(days).ok()
}

/// 月の初日と最終日を返す
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)?)?;
    Some((first, last))
}

/// "YYYY-MM-DD" を年・月・日の数値に分解してから日付を組み立てる
/// (タイムゾーン変換はしない)。形式に沿っていない場合は None
pub fn calendar_date(iso: &str) -> Option<NaiveDate> {
    let mut parts = iso.trim().splitn(3, '-');
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// 土日判定。日付が壊れている場合は平日扱い (false)
pub fn is_weekend(iso: &str) -> bool {
    calendar_date(iso)
        .map(|date| matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
        .unwrap_or(false)
}

/// NaiveDate -> "YYYY-MM-DD"
pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
