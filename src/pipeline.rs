//! End-to-end pipeline: map fields, audit rows, segment, train, blend.
//!
//! Only a mapping failure aborts the whole run. Past that point the audit
//! report is always returned, even when every row was rejected, and each
//! direction stands alone: an inbound failure leaves the outbound forecast
//! intact and vice versa, so the outcome carries one `Result` per
//! direction rather than failing the run.

use crate::calendar::HolidayCalendar;
use crate::config::PipelineConfig;
use crate::core::forecast::ForecastPoint;
use crate::core::record::Direction;
use crate::core::series::DailySeries;
use crate::ensemble::{combine, ModelReport};
use crate::error::{PipelineError, Result};
use crate::ingest::{audit_rows, map_fields, segment_records, AuditReport, FieldMapping, InputTable};
use crate::models::ModelKind;
use crate::trainer::train_models;
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

/// A model kind that failed during training, with the failure rendered
/// for display.
#[derive(Debug, Clone, Serialize)]
pub struct ModelDrop {
    pub kind: ModelKind,
    pub reason: String,
}

/// The published forecast for one direction.
#[derive(Debug, Clone, Serialize)]
pub struct DirectionForecast {
    pub direction: Direction,
    pub points: Vec<ForecastPoint>,
    /// Every surviving model with its validation metrics and weight.
    pub models: Vec<ModelReport>,
    pub dropped: Vec<ModelDrop>,
}

/// Everything a run produces, including per-direction failures.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub mapping: FieldMapping,
    pub audit: AuditReport,
    pub inbound: Result<DirectionForecast>,
    pub outbound: Result<DirectionForecast>,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    calendar: HolidayCalendar,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, calendar: HolidayCalendar) -> Self {
        Self { config, calendar }
    }

    /// Default configuration with the Chilean holiday calendar.
    pub fn with_defaults() -> Self {
        Self::new(PipelineConfig::default(), HolidayCalendar::chilean())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run against the wall clock.
    pub fn run(&self, table: &InputTable) -> Result<PipelineOutcome> {
        self.run_at(table, Utc::now().naive_utc())
    }

    /// Run with an explicit processing instant; rows after it are rejected
    /// as future-dated.
    pub fn run_at(&self, table: &InputTable, now: NaiveDateTime) -> Result<PipelineOutcome> {
        let mapping = map_fields(table, &self.config)?;
        let (records, audit) = audit_rows(table, &mapping, now);
        tracing::info!(
            accepted = audit.accepted,
            rejected = audit.rejected(),
            "audited input"
        );

        // No valid rows: keep the report, fail both directions, not the run.
        if records.is_empty() {
            let failure = PipelineError::InsufficientData {
                needed: self.config.min_training_days + 1,
                got: 0,
            };
            tracing::warn!("no rows survived the audit");
            return Ok(PipelineOutcome {
                mapping,
                audit,
                inbound: Err(failure.clone()),
                outbound: Err(failure),
            });
        }

        let (inbound_series, outbound_series) = segment_records(&records)?;
        let inbound = self.forecast_direction(&inbound_series);
        let outbound = self.forecast_direction(&outbound_series);

        Ok(PipelineOutcome {
            mapping,
            audit,
            inbound,
            outbound,
        })
    }

    fn forecast_direction(&self, series: &DailySeries) -> Result<DirectionForecast> {
        let output = train_models(series, &self.calendar, &self.config)?;
        let future_dates = future_dates(series.end_date(), self.config.horizon);
        let (points, models) = combine(&output.evaluations, &future_dates, self.config.mape_ceiling)?;

        let dropped = output
            .failures
            .into_iter()
            .map(|(kind, err)| ModelDrop {
                kind,
                reason: err.to_string(),
            })
            .collect();

        tracing::info!(
            direction = %series.direction(),
            days = points.len(),
            models = models.len(),
            "direction forecast ready"
        );
        Ok(DirectionForecast {
            direction: series.direction(),
            points,
            models,
            dropped,
        })
    }
}

/// The `horizon` dates immediately after `last`.
fn future_dates(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as i64).map(|k| last + Duration::days(k)).collect()
}
