//! Inverse-error ensemble over the surviving models.
//!
//! A model's weight is proportional to the inverse of its validation MAPE,
//! normalized so the retained weights sum to one. Models above the MAPE
//! ceiling are excluded outright and reported with a weight of exactly
//! zero. The per-day bounds are the min/max spread across the retained
//! forecasts, clamped to zero like the point forecast itself.

use crate::core::forecast::ForecastPoint;
use crate::error::{PipelineError, Result};
use crate::metrics::ValidationMetrics;
use crate::models::ModelKind;
use crate::trainer::ModelEvaluation;
use chrono::NaiveDate;
use serde::Serialize;

/// Guards the inverse weight against a MAPE of zero.
const MIN_MAPE: f64 = 1e-6;

/// One model's contribution to the published forecast.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub kind: ModelKind,
    pub metrics: ValidationMetrics,
    /// Zero when the model was excluded by the MAPE ceiling.
    pub weight: f64,
}

/// Blend the surviving forecasts into daily points with bounds.
///
/// When no survivor has a defined MAPE, which happens on an all-zero
/// validation window, every survivor is retained with equal weight. When
/// some do, the ones without are treated like ceiling exclusions.
pub fn combine(
    evaluations: &[ModelEvaluation],
    future_dates: &[NaiveDate],
    mape_ceiling: f64,
) -> Result<(Vec<ForecastPoint>, Vec<ModelReport>)> {
    for eval in evaluations {
        if eval.future_forecast.len() != future_dates.len() {
            return Err(PipelineError::DimensionMismatch {
                expected: future_dates.len(),
                got: eval.future_forecast.len(),
            });
        }
    }

    let weights = assign_weights(evaluations, mape_ceiling)?;
    let retained: Vec<usize> = (0..evaluations.len())
        .filter(|&i| weights[i] > 0.0)
        .collect();

    let mut points = Vec::with_capacity(future_dates.len());
    for (day, date) in future_dates.iter().enumerate() {
        let mut predicted = 0.0;
        let mut lower = f64::INFINITY;
        let mut upper = f64::NEG_INFINITY;
        for &i in &retained {
            let value = evaluations[i].future_forecast[day];
            predicted += weights[i] * value;
            lower = lower.min(value);
            upper = upper.max(value);
        }
        points.push(ForecastPoint {
            date: *date,
            predicted: predicted.max(0.0),
            lower: lower.max(0.0),
            upper: upper.max(0.0),
        });
    }

    let reports = evaluations
        .iter()
        .zip(&weights)
        .map(|(eval, &weight)| ModelReport {
            kind: eval.kind,
            metrics: eval.metrics.clone(),
            weight,
        })
        .collect();
    Ok((points, reports))
}

/// Per-evaluation weights summing to 1.0 over the retained set; excluded
/// models get exactly 0.0.
fn assign_weights(evaluations: &[ModelEvaluation], mape_ceiling: f64) -> Result<Vec<f64>> {
    if evaluations.is_empty() {
        return Err(PipelineError::InsufficientModels { got: 0 });
    }

    if evaluations.iter().all(|e| e.metrics.mape.is_none()) {
        let equal = 1.0 / evaluations.len() as f64;
        return Ok(vec![equal; evaluations.len()]);
    }

    let raw: Vec<f64> = evaluations
        .iter()
        .map(|eval| match eval.metrics.mape {
            Some(mape) if mape <= mape_ceiling => 1.0 / mape.max(MIN_MAPE),
            _ => 0.0,
        })
        .collect();

    let total: f64 = raw.iter().sum();
    if total == 0.0 {
        tracing::warn!(mape_ceiling, "every model exceeded the accuracy ceiling");
        return Err(PipelineError::InsufficientModels { got: 0 });
    }
    Ok(raw.iter().map(|w| w / total).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn eval(kind: ModelKind, mape: Option<f64>, forecast: Vec<f64>) -> ModelEvaluation {
        ModelEvaluation {
            kind,
            metrics: ValidationMetrics {
                mae: 1.0,
                rmse: 1.0,
                mape,
                r_squared: 0.5,
            },
            validation_forecast: vec![],
            future_forecast: forecast,
        }
    }

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    #[test]
    fn weights_are_inverse_to_mape() {
        let evals = vec![
            eval(ModelKind::Seasonal, Some(10.0), vec![10.0, 10.0]),
            eval(ModelKind::AutoRegressive, Some(30.0), vec![30.0, 30.0]),
        ];
        let (points, reports) = combine(&evals, &dates(2), 100.0).unwrap();

        assert_relative_eq!(reports[0].weight, 0.75);
        assert_relative_eq!(reports[1].weight, 0.25);
        assert_relative_eq!(reports[0].weight + reports[1].weight, 1.0);
        // 0.75 * 10 + 0.25 * 30.
        assert_relative_eq!(points[0].predicted, 15.0);
        assert_eq!(points[0].lower, 10.0);
        assert_eq!(points[0].upper, 30.0);
    }

    #[test]
    fn ceiling_exclusion_zeroes_the_weight_and_the_bounds() {
        let evals = vec![
            eval(ModelKind::Seasonal, Some(20.0), vec![10.0]),
            eval(ModelKind::RandomForest, Some(20.0), vec![14.0]),
            eval(ModelKind::GradientBoosting, Some(150.0), vec![500.0]),
        ];
        let (points, reports) = combine(&evals, &dates(1), 100.0).unwrap();

        assert_eq!(reports[2].weight, 0.0);
        assert_relative_eq!(reports[0].weight, 0.5);
        assert_relative_eq!(reports[1].weight, 0.5);
        // The excluded forecast contributes to neither the point nor the
        // bounds.
        assert_relative_eq!(points[0].predicted, 12.0);
        assert_eq!(points[0].upper, 14.0);
    }

    #[test]
    fn undefined_mape_everywhere_means_equal_weights() {
        let evals = vec![
            eval(ModelKind::Seasonal, None, vec![0.0]),
            eval(ModelKind::AutoRegressive, None, vec![0.0]),
            eval(ModelKind::RandomForest, None, vec![0.0]),
        ];
        let (points, reports) = combine(&evals, &dates(1), 100.0).unwrap();
        for report in &reports {
            assert_relative_eq!(report.weight, 1.0 / 3.0);
        }
        assert_eq!(points[0].predicted, 0.0);
    }

    #[test]
    fn undefined_mape_is_excluded_when_others_have_one() {
        let evals = vec![
            eval(ModelKind::Seasonal, Some(25.0), vec![8.0]),
            eval(ModelKind::AutoRegressive, None, vec![100.0]),
        ];
        let (points, reports) = combine(&evals, &dates(1), 100.0).unwrap();
        assert_relative_eq!(reports[0].weight, 1.0);
        assert_eq!(reports[1].weight, 0.0);
        assert_eq!(points[0].upper, 8.0);
    }

    #[test]
    fn all_models_above_the_ceiling_is_an_error() {
        let evals = vec![
            eval(ModelKind::Seasonal, Some(200.0), vec![1.0]),
            eval(ModelKind::AutoRegressive, Some(300.0), vec![2.0]),
        ];
        let err = combine(&evals, &dates(1), 100.0).unwrap_err();
        assert_eq!(err, PipelineError::InsufficientModels { got: 0 });
    }

    #[test]
    fn forecast_length_must_match_the_dates() {
        let evals = vec![eval(ModelKind::Seasonal, Some(10.0), vec![1.0, 2.0])];
        let err = combine(&evals, &dates(3), 100.0).unwrap_err();
        assert!(matches!(err, PipelineError::DimensionMismatch { .. }));
    }
}
