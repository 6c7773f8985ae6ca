//! Forecast accuracy metrics over a validation window.

use crate::error::{PipelineError, Result};
use serde::Serialize;

/// Accuracy of one model's validation forecast.
///
/// `mape` is `None` when every actual in the window is zero, since a
/// relative error is undefined there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub mape: Option<f64>,
    pub r_squared: f64,
}

/// Compare predictions against actuals.
///
/// MAPE averages `|a - p| / |a|` over the days with a nonzero actual only;
/// a constant actual series scores R² of 1.0 since there is no variance
/// left to explain.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<ValidationMetrics> {
    if actual.is_empty() {
        return Err(PipelineError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(PipelineError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let n = actual.len() as f64;
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut pct_sum = 0.0;
    let mut pct_n = 0usize;

    for (a, p) in actual.iter().zip(predicted) {
        let err = a - p;
        abs_sum += err.abs();
        sq_sum += err * err;
        if *a != 0.0 {
            pct_sum += (err / a).abs();
            pct_n += 1;
        }
    }

    let mean = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let r_squared = if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - sq_sum / ss_tot
    };

    Ok(ValidationMetrics {
        mae: abs_sum / n,
        rmse: (sq_sum / n).sqrt(),
        mape: if pct_n == 0 {
            None
        } else {
            Some(pct_sum / pct_n as f64 * 100.0)
        },
        r_squared,
    })
}
