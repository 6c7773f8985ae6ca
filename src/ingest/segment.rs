//! Segmenter: splits validated records into per-direction daily series.
//!
//! Both series share one union date axis, from the earliest to the latest
//! call date across all records regardless of direction. Days without calls
//! in a direction are zero-filled, so the two series always have identical
//! start dates and lengths.

use crate::core::record::{CallRecord, Direction};
use crate::core::series::DailySeries;
use crate::error::{PipelineError, Result};
use std::collections::HashMap;

/// Build the inbound and outbound daily series over the union date axis.
///
/// Fails with [`PipelineError::EmptyData`] when no records remain after
/// auditing.
pub fn segment_records(records: &[CallRecord]) -> Result<(DailySeries, DailySeries)> {
    if records.is_empty() {
        return Err(PipelineError::EmptyData);
    }

    let start = records.iter().map(|r| r.date()).min().unwrap();
    let end = records.iter().map(|r| r.date()).max().unwrap();
    let span = (end - start).num_days() as usize + 1;

    let mut per_day: HashMap<(Direction, usize), f64> = HashMap::new();
    for record in records {
        let day = (record.date() - start).num_days() as usize;
        *per_day.entry((record.direction, day)).or_insert(0.0) += 1.0;
    }

    let mut build = |direction: Direction| -> Result<DailySeries> {
        let counts: Vec<f64> = (0..span)
            .map(|day| per_day.get(&(direction, day)).copied().unwrap_or(0.0))
            .collect();
        DailySeries::new(direction, start, counts)
    };

    let inbound = build(Direction::Inbound)?;
    let outbound = build(Direction::Outbound)?;

    tracing::debug!(
        start = %start,
        end = %end,
        days = span,
        inbound_total = inbound.counts().iter().sum::<f64>(),
        outbound_total = outbound.counts().iter().sum::<f64>(),
        "segmented records"
    );
    Ok((inbound, outbound))
}
