//! Error types for the callcast pipeline.

use crate::ingest::mapper::LogicalField;
use crate::models::ModelKind;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the forecasting pipeline.
///
/// Row-level rejections are deliberately not errors: they are counted in
/// the [`AuditReport`](crate::ingest::audit::AuditReport) and the run
/// continues. Model-kind failures surface as [`PipelineError::ModelFit`]
/// but only abort a direction once fewer than two kinds survive.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// One or more required columns could not be identified in the input.
    #[error("required fields could not be mapped: {}", join_fields(.missing))]
    FieldMapping { missing: Vec<LogicalField> },

    /// A series is too short to split into training and validation windows.
    #[error("insufficient data: need at least {needed} days, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A single model kind failed to fit or timed out.
    #[error("{kind} failed to fit: {reason}")]
    ModelFit { kind: ModelKind, reason: String },

    /// Fewer than two model kinds survived training for a direction.
    #[error("insufficient models: only {got} of 4 kinds survived, need at least 2")]
    InsufficientModels { got: usize },

    /// Input contained no usable data.
    #[error("empty input data")]
    EmptyData,

    /// Mismatched lengths between paired sequences.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

fn join_fields(fields: &[LogicalField]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}
