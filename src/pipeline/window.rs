// src/pipeline/window.rs

//! Target-day window selection.
//!
//! The archiver processes submissions from the full calendar day before the
//! run, in the process's local time zone. The comparison is on year/month/day
//! components, not a rolling 24-hour span, so a run shortly after midnight on
//! the 1st still selects the last day of the previous month.

use chrono::{DateTime, Days, Local, NaiveDate, TimeZone};

/// The calendar day whose submissions are in scope for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    day: NaiveDate,
}

impl TimeWindow {
    /// Window covering the full calendar day before `now` (local time).
    pub fn yesterday_of(now: DateTime<Local>) -> Self {
        let day = now
            .date_naive()
            .checked_sub_days(Days::new(1))
            .unwrap_or_else(|| now.date_naive());
        Self { day }
    }

    /// Window covering yesterday relative to the current wall clock.
    pub fn yesterday() -> Self {
        Self::yesterday_of(Local::now())
    }

    /// The selected calendar day.
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// Whether a timestamp (epoch seconds) falls on the target day.
    pub fn contains(&self, epoch_seconds: i64) -> bool {
        match Local.timestamp_opt(epoch_seconds, 0).single() {
            Some(ts) => ts.date_naive() == self.day,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_epoch(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, m, d, h, min, s)
            .single()
            .unwrap()
            .timestamp()
    }

    #[test]
    fn test_plain_yesterday() {
        let now = Local.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).single().unwrap();
        let window = TimeWindow::yesterday_of(now);

        assert!(window.contains(local_epoch(2024, 6, 14, 0, 0, 0)));
        assert!(window.contains(local_epoch(2024, 6, 14, 23, 59, 59)));
        assert!(!window.contains(local_epoch(2024, 6, 15, 0, 0, 0)));
        assert!(!window.contains(local_epoch(2024, 6, 13, 23, 59, 59)));
    }

    #[test]
    fn test_leap_year_month_boundary() {
        // Evaluated just after midnight on March 1st of a leap year:
        // the window must be Feb 29 exactly.
        let now = Local.with_ymd_and_hms(2024, 3, 1, 0, 5, 0).single().unwrap();
        let window = TimeWindow::yesterday_of(now);

        assert_eq!(window.day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(window.contains(local_epoch(2024, 2, 29, 12, 0, 0)));
        assert!(!window.contains(local_epoch(2024, 3, 1, 0, 1, 0)));
        assert!(!window.contains(local_epoch(2024, 2, 28, 23, 59, 59)));
    }

    #[test]
    fn test_year_boundary() {
        let now = Local.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).single().unwrap();
        let window = TimeWindow::yesterday_of(now);

        assert_eq!(window.day(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert!(window.contains(local_epoch(2024, 12, 31, 18, 30, 0)));
        assert!(!window.contains(local_epoch(2025, 1, 1, 0, 0, 1)));
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let window = TimeWindow::yesterday();
        assert!(!window.contains(i64::MAX));
    }
}
