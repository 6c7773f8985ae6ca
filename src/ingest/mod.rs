//! Input ingestion: field mapping, row auditing, and daily segmentation.

pub mod audit;
pub mod mapper;
pub mod segment;

pub use audit::{audit_rows, AuditReport, RejectReason};
pub use mapper::{map_fields, FieldMapping, LogicalField};
pub use segment::segment_records;

/// Raw tabular input as delivered by the upload handler: one header row
/// plus string-typed cells. Encoding is already resolved upstream.
#[derive(Debug, Clone, Default)]
pub struct InputTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl InputTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// The cell at (row, column), or `""` for short rows.
    pub(crate) fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}
