//! Forecast output types handed to the display layer.

use chrono::NaiveDate;
use serde::Serialize;

/// One future day's prediction with bounds.
///
/// The bounds are the min/max spread across the retained ensemble members
/// for that day, not a statistical confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_values() {
        let point = ForecastPoint {
            date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            predicted: 42.5,
            lower: 40.0,
            upper: 45.0,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["date"], "2024-02-10");
        assert_eq!(json["predicted"], 42.5);
    }
}
