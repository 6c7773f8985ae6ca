//! Multi-model trainer: fits every model kind against a held-out window
//! and scores it, tolerating per-kind failures.
//!
//! Kinds run on their own threads against a shared wall-clock deadline, so
//! one runaway fit cannot stall the direction. A kind that fails or times
//! out is recorded and skipped; the direction only aborts when fewer than
//! two kinds survive.

use crate::calendar::HolidayCalendar;
use crate::config::PipelineConfig;
use crate::core::record::Direction;
use crate::core::series::DailySeries;
use crate::error::{PipelineError, Result};
use crate::metrics::{evaluate, ValidationMetrics};
use crate::models::{build_model, ModelKind};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

/// The minimum surviving kinds for an ensemble to make sense.
pub const MIN_SURVIVING_MODELS: usize = 2;

/// One surviving model's validation score and forecasts.
#[derive(Debug, Clone)]
pub struct ModelEvaluation {
    pub kind: ModelKind,
    pub metrics: ValidationMetrics,
    /// Prediction over the held-out window, aligned with its actuals.
    pub validation_forecast: Vec<f64>,
    /// Prediction over the configured horizon, from a refit on all days.
    pub future_forecast: Vec<f64>,
}

/// Training outcome for one direction.
#[derive(Debug, Clone)]
pub struct TrainerOutput {
    pub direction: Direction,
    /// Surviving models in [`ModelKind::ALL`] order.
    pub evaluations: Vec<ModelEvaluation>,
    pub failures: Vec<(ModelKind, PipelineError)>,
}

/// Split the series, fit and score every kind, refit survivors on the full
/// history.
///
/// The held-out window is the trailing `validation_window` days, shrunk so
/// that at least `min_training_days` remain for training. A series of
/// `min_training_days` or fewer cannot be split at all.
pub fn train_models(
    series: &DailySeries,
    calendar: &HolidayCalendar,
    config: &PipelineConfig,
) -> Result<TrainerOutput> {
    let n = series.len();
    if n <= config.min_training_days {
        return Err(PipelineError::InsufficientData {
            needed: config.min_training_days + 1,
            got: n,
        });
    }
    let val_len = config.validation_window.min(n - config.min_training_days);
    let train = series.slice(0, n - val_len)?;
    let val_actual = series.counts()[n - val_len..].to_vec();

    tracing::info!(
        direction = %series.direction(),
        days = n,
        train_days = train.len(),
        validation_days = val_len,
        "training models"
    );

    let results = run_kinds(series, &train, val_len, calendar, config);

    let mut evaluations = Vec::new();
    let mut failures = Vec::new();
    for (kind, outcome) in results {
        match outcome.and_then(|(validation_forecast, future_forecast)| {
            let metrics = evaluate(&val_actual, &validation_forecast)?;
            Ok(ModelEvaluation {
                kind,
                metrics,
                validation_forecast,
                future_forecast,
            })
        }) {
            Ok(eval) => {
                tracing::info!(
                    direction = %series.direction(),
                    model = %kind,
                    mae = eval.metrics.mae,
                    mape = ?eval.metrics.mape,
                    "model trained"
                );
                evaluations.push(eval);
            }
            Err(err) => {
                tracing::warn!(direction = %series.direction(), model = %kind, %err, "model failed");
                failures.push((kind, err));
            }
        }
    }

    if evaluations.len() < MIN_SURVIVING_MODELS {
        return Err(PipelineError::InsufficientModels {
            got: evaluations.len(),
        });
    }
    Ok(TrainerOutput {
        direction: series.direction(),
        evaluations,
        failures,
    })
}

type KindOutcome = Result<(Vec<f64>, Vec<f64>)>;

/// Run every kind on its own thread and collect results until the shared
/// deadline; kinds still running afterwards are reported as timed out.
fn run_kinds(
    series: &DailySeries,
    train: &DailySeries,
    val_len: usize,
    calendar: &HolidayCalendar,
    config: &PipelineConfig,
) -> Vec<(ModelKind, KindOutcome)> {
    let (tx, rx) = mpsc::channel::<(ModelKind, KindOutcome)>();
    for kind in ModelKind::ALL {
        let tx = tx.clone();
        let series = series.clone();
        let train = train.clone();
        let calendar = calendar.clone();
        let config = config.clone();
        thread::spawn(move || {
            let outcome = fit_and_forecast(kind, &series, &train, val_len, &calendar, &config);
            // A send failure means the trainer already gave up on us.
            let _ = tx.send((kind, outcome));
        });
    }
    drop(tx);

    let deadline = Instant::now() + config.fit_timeout;
    let mut received: Vec<(ModelKind, KindOutcome)> = Vec::new();
    while received.len() < ModelKind::ALL.len() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(entry) => received.push(entry),
            Err(_) => break,
        }
    }

    // Fill in timeouts for the kinds that never reported.
    let mut results = Vec::with_capacity(ModelKind::ALL.len());
    for kind in ModelKind::ALL {
        let outcome = match received.iter().position(|(k, _)| *k == kind) {
            Some(i) => received.swap_remove(i).1,
            None => Err(PipelineError::ModelFit {
                kind,
                reason: format!("fit timed out after {:?}", config.fit_timeout),
            }),
        };
        results.push((kind, outcome));
    }
    results
}

fn fit_and_forecast(
    kind: ModelKind,
    series: &DailySeries,
    train: &DailySeries,
    val_len: usize,
    calendar: &HolidayCalendar,
    config: &PipelineConfig,
) -> KindOutcome {
    let mut model = build_model(kind, calendar, config);
    model.fit(train)?;
    let validation_forecast = model.predict(val_len)?;

    // Refit on the full history so the future forecast sees every day.
    model.fit(series)?;
    let future_forecast = model.predict(config.horizon)?;
    Ok((validation_forecast, future_forecast))
}
