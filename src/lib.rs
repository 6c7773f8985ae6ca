//! Call volume forecasting for call-center staffing.
//!
//! `callcast` turns a raw call-log export into per-direction daily volume
//! forecasts. A run maps the export's columns onto the required logical
//! fields, audits every row, splits the valid records into inbound and
//! outbound daily series over a shared date axis, trains four model
//! families per direction against a held-out window, and blends the
//! survivors into a weighted forecast with per-day bounds.
//!
//! ```no_run
//! use callcast::ingest::InputTable;
//! use callcast::pipeline::Pipeline;
//!
//! # fn main() -> callcast::Result<()> {
//! let table = InputTable::new(
//!     vec!["Fecha".into(), "Telefono".into(), "Sentido".into(), "Atendida".into()],
//!     vec![vec![
//!         "02-01-2024 09:15:00".into(),
//!         "+56912345678".into(),
//!         "in".into(),
//!         "si".into(),
//!     ]],
//! );
//! let outcome = Pipeline::with_defaults().run(&table)?;
//! println!("accepted {} of {} rows", outcome.audit.accepted, outcome.audit.total_rows);
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod config;
pub mod core;
pub mod ensemble;
pub mod error;
pub mod features;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod trainer;

pub use error::{PipelineError, Result};

/// Commonly used types.
pub mod prelude {
    pub use crate::calendar::HolidayCalendar;
    pub use crate::config::PipelineConfig;
    pub use crate::core::{CallRecord, DailySeries, Direction, ForecastPoint};
    pub use crate::ensemble::ModelReport;
    pub use crate::error::{PipelineError, Result};
    pub use crate::ingest::{AuditReport, FieldMapping, InputTable};
    pub use crate::metrics::ValidationMetrics;
    pub use crate::models::ModelKind;
    pub use crate::pipeline::{DirectionForecast, Pipeline, PipelineOutcome};
}
