//! Arithmetic helpers for reporting. Every rate and average treats an empty
//! denominator as zero.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::constants::{COURSE_BASE_PRICE_CENTS, COURSE_PRICE_PER_MODULE_CENTS};

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole * 100`, rounded to two decimals
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

/// `part / whole * 100`, truncated to a whole number
pub fn truncated_percentage(part: i64, whole: i64) -> i64 {
    if whole <= 0 {
        return 0;
    }
    (part * 100) / whole
}

/// Mean of `values` rounded to two decimals
pub fn average<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_u64), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return 0.0;
    }
    round2(sum / count as f64)
}

/// A calendar month as a half-open UTC interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    pub label: String,
    pub year: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn month_offset(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// The `count` calendar months ending with the month of `now`, oldest first
pub fn month_windows(now: DateTime<Utc>, count: u32) -> Vec<MonthWindow> {
    (0..count as i32)
        .rev()
        .map(|back| {
            let (year, month) = month_offset(now.year(), now.month(), -back);
            let (end_year, end_month) = month_offset(year, month, 1);
            let start = month_start(year, month);
            MonthWindow {
                label: start.format("%b").to_string(),
                year,
                start,
                end: month_start(end_year, end_month),
            }
        })
        .collect()
}

/// Catalog price for a course with `module_count` modules
pub fn course_price(module_count: i64) -> Decimal {
    Decimal::new(COURSE_BASE_PRICE_CENTS, 2)
        + Decimal::new(COURSE_PRICE_PER_MODULE_CENTS, 2) * Decimal::from(module_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_denominators_are_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(truncated_percentage(5, 0), 0);
        assert_eq!(average(Vec::<f64>::new()), 0.0);
    }

    #[test]
    fn test_truncated_percentage_rounds_down() {
        assert_eq!(truncated_percentage(2, 3), 66);
        assert_eq!(truncated_percentage(3, 3), 100);
    }

    #[test]
    fn test_percentage_and_average_round() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(average([50.0, 100.0, 0.0]), 50.0);
        assert_eq!(average([10.0, 20.0, 20.0]), 16.67);
    }

    #[test]
    fn test_month_windows_cross_year_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 2, 15, 12, 0, 0).unwrap();
        let windows = month_windows(now, 6);

        let labels: Vec<_> = windows.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(labels, vec!["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
        assert_eq!(windows[0].year, 2023);
        assert_eq!(windows[3].end, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(windows[5].start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(windows[5].end, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_course_price() {
        assert_eq!(course_price(0), Decimal::new(9999, 2));
        assert_eq!(course_price(3), Decimal::new(24996, 2));
    }
}
