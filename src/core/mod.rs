//! Core domain types: call records, daily series, and forecast points.

pub mod forecast;
pub mod record;
pub mod series;

pub use forecast::ForecastPoint;
pub use record::{CallRecord, Direction};
pub use series::DailySeries;
