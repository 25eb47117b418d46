use chrono::{Datelike, Duration, NaiveDate};

/// Whole-month difference by year/month subtraction; day-of-month ignored.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let delta = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(delta)
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Shifts by calendar months, clamping the day to the target month's length.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = date.day().min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    (first_next - Duration::days(1)).day()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn months_between_ignores_day_of_month() {
        assert_eq!(months_between(date(2025, 1, 31), date(2025, 2, 1)), 1);
        assert_eq!(months_between(date(2024, 11, 5), date(2025, 2, 5)), 3);
        assert_eq!(months_between(date(2025, 3, 1), date(2025, 2, 28)), -1);
    }

    #[test]
    fn week_start_is_monday_anchored() {
        // 2025-03-12 is a Wednesday.
        assert_eq!(week_start(date(2025, 3, 12)), date(2025, 3, 10));
        // Sunday belongs to the week started the previous Monday.
        assert_eq!(week_start(date(2025, 3, 16)), date(2025, 3, 10));
        assert_eq!(week_start(date(2025, 3, 10)), date(2025, 3, 10));
    }

    #[test]
    fn shift_months_clamps_to_month_length() {
        assert_eq!(shift_months(date(2025, 1, 31), 1), date(2025, 2, 28));
        assert_eq!(shift_months(date(2025, 5, 31), -3), date(2025, 2, 28));
        assert_eq!(shift_months(date(2025, 11, 15), 2), date(2026, 1, 15));
    }
}
