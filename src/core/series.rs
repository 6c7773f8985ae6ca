//! Daily call-count series.

use crate::core::record::Direction;
use crate::error::{PipelineError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

/// An ordered daily count series for one direction.
///
/// The date axis is implicit: day `i` is `start + i`. Storing counts this
/// way makes the no-gap invariant hold by construction; the segmenter is
/// responsible for zero-filling days without calls before building one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    direction: Direction,
    start: NaiveDate,
    counts: Vec<f64>,
}

impl DailySeries {
    /// Create a series. Fails on an empty count vector.
    pub fn new(direction: Direction, start: NaiveDate, counts: Vec<f64>) -> Result<Self> {
        if counts.is_empty() {
            return Err(PipelineError::EmptyData);
        }
        Ok(Self {
            direction,
            start,
            counts,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of days covered.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// The last covered date.
    pub fn end_date(&self) -> NaiveDate {
        self.date_at(self.counts.len() - 1)
    }

    /// The date of day `i`.
    pub fn date_at(&self, i: usize) -> NaiveDate {
        self.start + Duration::days(i as i64)
    }

    pub fn weekday_at(&self, i: usize) -> Weekday {
        self.date_at(i).weekday()
    }

    /// Materialize the full date axis.
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.counts.len()).map(|i| self.date_at(i)).collect()
    }

    /// Extract days `[start_idx, end_idx)` as a new series.
    pub fn slice(&self, start_idx: usize, end_idx: usize) -> Result<DailySeries> {
        if start_idx > end_idx {
            return Err(PipelineError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end_idx > self.counts.len() || start_idx == end_idx {
            return Err(PipelineError::InvalidParameter(format!(
                "slice {}..{} out of range for series of {} days",
                start_idx,
                end_idx,
                self.counts.len()
            )));
        }
        Ok(DailySeries {
            direction: self.direction,
            start: self.date_at(start_idx),
            counts: self.counts[start_idx..end_idx].to_vec(),
        })
    }
}
