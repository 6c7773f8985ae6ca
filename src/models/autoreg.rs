//! Autoregressive model with automatic differencing and order selection.
//!
//! The series is differenced up to twice, as long as differencing keeps
//! shrinking the variance, then an AR(p) is fitted by least squares for
//! each candidate order and the order with the lowest AIC wins. Order
//! zero is the mean model and always fits, so a flat or all-zero series
//! is handled without a special case.

use crate::core::series::DailySeries;
use crate::error::{PipelineError, Result};
use crate::models::{Forecaster, ModelKind};

const MAX_DIFFERENCING: usize = 2;
const MAX_ORDER: usize = 6;
/// Differencing must shrink variance by at least this factor to be kept.
const DIFF_VARIANCE_RATIO: f64 = 0.9;

#[derive(Debug, Clone)]
struct FittedState {
    /// Constant term followed by lag coefficients, most recent lag first.
    coeffs: Vec<f64>,
    order: usize,
    /// Last `order` values of the differenced series, oldest first.
    tail: Vec<f64>,
    /// Last observed value at each integration level, outermost first.
    level_last: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct AutoRegressive {
    state: Option<FittedState>,
}

impl AutoRegressive {
    pub fn new() -> Self {
        Self::default()
    }

    fn fit_error(&self, reason: &str) -> PipelineError {
        PipelineError::ModelFit {
            kind: self.kind(),
            reason: reason.to_string(),
        }
    }
}

impl Forecaster for AutoRegressive {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        let y = series.counts();
        if y.len() < 3 {
            return Err(self.fit_error("needs at least 3 days"));
        }

        // Difference while it keeps reducing variance.
        let mut work = y.to_vec();
        let mut level_last = Vec::new();
        while level_last.len() < MAX_DIFFERENCING && work.len() > 4 {
            let diffed = difference(&work);
            if variance(&diffed) < DIFF_VARIANCE_RATIO * variance(&work) {
                level_last.push(*work.last().unwrap());
                work = diffed;
            } else {
                break;
            }
        }

        // Try every order and keep the lowest AIC. Order zero always has a
        // solution, so `best` is never empty afterwards.
        let p_max = MAX_ORDER.min(work.len().saturating_sub(2) / 2);
        let mut best: Option<(f64, usize, Vec<f64>)> = None;
        for p in 0..=p_max {
            let Some((coeffs, sse, n_eff)) = fit_order(&work, p) else {
                continue;
            };
            let aic = n_eff as f64 * (sse / n_eff as f64).max(1e-12).ln()
                + 2.0 * (p + 1) as f64;
            if best.as_ref().map_or(true, |(best_aic, _, _)| aic < *best_aic) {
                best = Some((aic, p, coeffs));
            }
        }
        let (_, order, coeffs) = best.ok_or_else(|| self.fit_error("no solvable order"))?;

        let tail = work[work.len() - order..].to_vec();
        tracing::debug!(order, differencing = level_last.len(), "autoregressive fit");
        self.state = Some(FittedState {
            coeffs,
            order,
            tail,
            level_last,
        });
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| self.fit_error("predict called before fit"))?;
        if horizon == 0 {
            return Err(PipelineError::InvalidParameter(
                "horizon must be positive".to_string(),
            ));
        }

        // Iterate the recursion on the differenced scale.
        let mut values = state.tail.clone();
        let mut forecast = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let mut next = state.coeffs[0];
            for lag in 1..=state.order {
                next += state.coeffs[lag] * values[values.len() - lag];
            }
            values.push(next);
            forecast.push(next);
        }

        // Undo the differencing, innermost level first.
        for last in state.level_last.iter().rev() {
            let mut prev = *last;
            for value in forecast.iter_mut() {
                prev += *value;
                *value = prev;
            }
        }

        Ok(forecast.into_iter().map(|v| v.max(0.0)).collect())
    }

    fn kind(&self) -> ModelKind {
        ModelKind::AutoRegressive
    }
}

fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

/// Least-squares AR(p) fit. Returns the coefficients, the residual sum of
/// squares, and the number of fitted equations, or `None` when the normal
/// equations are singular or there are too few rows.
fn fit_order(values: &[f64], p: usize) -> Option<(Vec<f64>, f64, usize)> {
    let n = values.len();
    if n < p + 2 {
        return None;
    }
    let n_eff = n - p;
    let dim = p + 1;

    // Accumulate X'X and X'y directly; rows are [1, y[t-1], .., y[t-p]].
    let mut xtx = vec![vec![0.0f64; dim]; dim];
    let mut xty = vec![0.0f64; dim];
    for t in p..n {
        let mut row = Vec::with_capacity(dim);
        row.push(1.0);
        for lag in 1..=p {
            row.push(values[t - lag]);
        }
        for i in 0..dim {
            xty[i] += row[i] * values[t];
            for j in 0..dim {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    let coeffs = solve(xtx, xty)?;

    let mut sse = 0.0;
    for t in p..n {
        let mut fitted = coeffs[0];
        for lag in 1..=p {
            fitted += coeffs[lag] * values[t - lag];
        }
        sse += (values[t] - fitted).powi(2);
    }
    Some((coeffs, sse, n_eff))
}

/// Gaussian elimination with partial pivoting. `None` on a singular system.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap();
        if a[pivot_row][col].abs() < 1e-10 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0f64; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for col in row + 1..n {
            sum -= a[row][col] * x[col];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Direction;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series(counts: Vec<f64>) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        DailySeries::new(Direction::Inbound, start, counts).unwrap()
    }

    #[test]
    fn extends_a_linear_trend_through_differencing() {
        // First difference is constant, so d=1 and the mean model on the
        // differenced scale reproduce the line exactly.
        let counts: Vec<f64> = (0..20).map(|i| 3.0 + 2.0 * i as f64).collect();
        let mut model = AutoRegressive::new();
        model.fit(&series(counts)).unwrap();

        let forecast = model.predict(3).unwrap();
        assert_relative_eq!(forecast[0], 3.0 + 2.0 * 20.0, epsilon = 1e-6);
        assert_relative_eq!(forecast[2], 3.0 + 2.0 * 22.0, epsilon = 1e-6);
    }

    #[test]
    fn all_zero_series_forecasts_zero() {
        let mut model = AutoRegressive::new();
        model.fit(&series(vec![0.0; 30])).unwrap();
        let forecast = model.predict(28).unwrap();
        assert_eq!(forecast, vec![0.0; 28]);
    }

    #[test]
    fn flat_series_forecasts_the_level() {
        let mut model = AutoRegressive::new();
        model.fit(&series(vec![12.0; 25])).unwrap();
        let forecast = model.predict(5).unwrap();
        for value in forecast {
            assert_relative_eq!(value, 12.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn forecasts_are_never_negative() {
        let counts: Vec<f64> = (0..15).map(|i| (28.0 - 2.0 * i as f64).max(0.0)).collect();
        let mut model = AutoRegressive::new();
        model.fit(&series(counts)).unwrap();
        let forecast = model.predict(28).unwrap();
        assert!(forecast.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn too_short_series_fails() {
        let mut model = AutoRegressive::new();
        assert!(matches!(
            model.fit(&series(vec![1.0, 2.0])),
            Err(PipelineError::ModelFit { .. })
        ));
    }

    #[test]
    fn solver_rejects_singular_systems() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(solve(a, vec![1.0, 2.0]).is_none());
    }
}
