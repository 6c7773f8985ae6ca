//! Data auditor: row-level validation with a count-by-reason report.
//!
//! Rejection is binary; no row is repaired. Timestamps strictly after the
//! processing instant cannot represent past call volume and are dropped as
//! data-entry errors.

use crate::core::record::{parse_answered, parse_timestamp, CallRecord, Direction};
use crate::ingest::{FieldMapping, InputTable};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Why a row was excluded from the valid set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    UnparseableTimestamp,
    FutureTimestamp,
    MissingDirection,
    MissingAnswered,
}

/// Data-quality report: how many rows were seen, kept, and dropped per
/// rejection reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub total_rows: usize,
    pub accepted: usize,
    pub unparseable_timestamp: usize,
    pub future_timestamp: usize,
    pub missing_direction: usize,
    pub missing_answered: usize,
}

impl AuditReport {
    pub fn count(&self, reason: RejectReason) -> usize {
        match reason {
            RejectReason::UnparseableTimestamp => self.unparseable_timestamp,
            RejectReason::FutureTimestamp => self.future_timestamp,
            RejectReason::MissingDirection => self.missing_direction,
            RejectReason::MissingAnswered => self.missing_answered,
        }
    }

    pub fn rejected(&self) -> usize {
        self.total_rows - self.accepted
    }

    fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::UnparseableTimestamp => self.unparseable_timestamp += 1,
            RejectReason::FutureTimestamp => self.future_timestamp += 1,
            RejectReason::MissingDirection => self.missing_direction += 1,
            RejectReason::MissingAnswered => self.missing_answered += 1,
        }
    }
}

/// Validate every mapped row against `now`, the processing instant.
///
/// Pure: consumes the table and mapping, produces the typed records and a
/// report, touches nothing else.
pub fn audit_rows(
    table: &InputTable,
    mapping: &FieldMapping,
    now: NaiveDateTime,
) -> (Vec<CallRecord>, AuditReport) {
    let mut report = AuditReport {
        total_rows: table.rows.len(),
        ..AuditReport::default()
    };
    let mut records = Vec::with_capacity(table.rows.len());

    for row in 0..table.rows.len() {
        match audit_row(table, mapping, row, now) {
            Ok(record) => {
                report.accepted += 1;
                records.push(record);
            }
            Err(reason) => report.record(reason),
        }
    }

    tracing::debug!(
        total = report.total_rows,
        accepted = report.accepted,
        rejected = report.rejected(),
        "audit finished"
    );
    (records, report)
}

fn audit_row(
    table: &InputTable,
    mapping: &FieldMapping,
    row: usize,
    now: NaiveDateTime,
) -> std::result::Result<CallRecord, RejectReason> {
    let timestamp = parse_timestamp(table.cell(row, mapping.timestamp))
        .ok_or(RejectReason::UnparseableTimestamp)?;
    if timestamp > now {
        return Err(RejectReason::FutureTimestamp);
    }
    let direction = Direction::parse(table.cell(row, mapping.direction))
        .ok_or(RejectReason::MissingDirection)?;
    let answered = parse_answered(table.cell(row, mapping.answered))
        .ok_or(RejectReason::MissingAnswered)?;
    Ok(CallRecord {
        timestamp,
        phone: table.cell(row, mapping.phone).trim().to_string(),
        direction,
        answered,
    })
}
