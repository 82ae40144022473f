//! Business-day arithmetic: weekend and holiday exclusion.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// True when `date` is neither a weekend nor a configured holiday.
pub fn is_business_day(date: NaiveDate, holidays: &[NaiveDate]) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.contains(&date)
}

/// All business days in `[start, end]`, ascending. Empty when start > end.
pub fn business_days(start: NaiveDate, end: NaiveDate, holidays: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = start;
    while day <= end {
        if is_business_day(day, holidays) {
            days.push(day);
        }
        day += Duration::days(1);
    }
    days
}

/// The closest business day strictly before `date`.
pub fn prev_business_day(date: NaiveDate, holidays: &[NaiveDate]) -> NaiveDate {
    let mut day = date - Duration::days(1);
    while !is_business_day(day, holidays) {
        day -= Duration::days(1);
    }
    day
}
