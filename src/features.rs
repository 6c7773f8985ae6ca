//! Calendar feature extraction for the tree-based models.
//!
//! Each day is described by its calendar position plus trailing rolling
//! means over the history strictly before it. Using only prior history
//! keeps recursive multi-day forecasting consistent with training: at
//! prediction time the same function runs against history extended with
//! the model's own previous outputs.

use crate::calendar::HolidayCalendar;
use crate::core::series::DailySeries;
use chrono::{Datelike, NaiveDate};

/// Trailing windows, in days, for the rolling-mean features.
pub const ROLLING_WINDOWS: [usize; 3] = [7, 14, 28];

/// Number of features per row.
pub const FEATURE_COUNT: usize = 4 + ROLLING_WINDOWS.len();

/// Feature vector for one day given the counts strictly before it.
///
/// Layout: day of week (1-7, Monday first), day of month, month,
/// holiday flag, then one trailing mean per window.
pub fn feature_row(date: NaiveDate, history: &[f64], calendar: &HolidayCalendar) -> Vec<f64> {
    let mut row = Vec::with_capacity(FEATURE_COUNT);
    row.push(date.weekday().number_from_monday() as f64);
    row.push(date.day() as f64);
    row.push(date.month() as f64);
    row.push(if calendar.is_holiday(date) { 1.0 } else { 0.0 });
    for window in ROLLING_WINDOWS {
        row.push(trailing_mean(history, window));
    }
    row
}

/// Mean of the last `window` values, shrinking to however many exist.
/// Zero when the history is empty.
pub fn trailing_mean(history: &[f64], window: usize) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let take = window.min(history.len());
    let tail = &history[history.len() - take..];
    tail.iter().sum::<f64>() / take as f64
}

/// Build the supervised training set for a series.
///
/// Day 0 has no prior history and is skipped; every later day becomes one
/// row targeting its own count.
pub fn training_matrix(
    series: &DailySeries,
    calendar: &HolidayCalendar,
) -> (Vec<Vec<f64>>, Vec<f64>) {
    let counts = series.counts();
    let mut x = Vec::with_capacity(counts.len().saturating_sub(1));
    let mut y = Vec::with_capacity(counts.len().saturating_sub(1));
    for i in 1..counts.len() {
        x.push(feature_row(series.date_at(i), &counts[..i], calendar));
        y.push(counts[i]);
    }
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Direction;

    fn series(counts: Vec<f64>) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        DailySeries::new(Direction::Inbound, start, counts).unwrap()
    }

    #[test]
    fn calendar_positions_are_encoded() {
        // 2024-01-01 was a Monday; make it a holiday.
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let calendar = HolidayCalendar::from_table(vec![(date, "Año Nuevo".to_string())]);
        let row = feature_row(date, &[10.0, 20.0], &calendar);
        assert_eq!(row.len(), FEATURE_COUNT);
        assert_eq!(row[0], 1.0); // Monday
        assert_eq!(row[1], 1.0);
        assert_eq!(row[2], 1.0);
        assert_eq!(row[3], 1.0); // holiday
        assert_eq!(row[4], 15.0); // trailing mean over both values
    }

    #[test]
    fn trailing_mean_shrinks_to_available_history() {
        let history = [2.0, 4.0, 6.0];
        assert_eq!(trailing_mean(&history, 2), 5.0);
        assert_eq!(trailing_mean(&history, 7), 4.0);
        assert_eq!(trailing_mean(&[], 7), 0.0);
    }

    #[test]
    fn training_matrix_skips_the_first_day() {
        let s = series(vec![1.0, 2.0, 3.0, 4.0]);
        let calendar = HolidayCalendar::empty();
        let (x, y) = training_matrix(&s, &calendar);
        assert_eq!(x.len(), 3);
        assert_eq!(y, vec![2.0, 3.0, 4.0]);
        // Row for day 1 sees only day 0's count.
        assert_eq!(x[0][4], 1.0);
        // Row for day 3 averages days 0-2.
        assert_eq!(x[2][4], 2.0);
    }
}
