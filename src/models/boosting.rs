//! Gradient boosting over calendar features.
//!
//! Squared-error boosting: start from the target mean, then fit shallow
//! trees to the running residuals, each contributing a fraction of its
//! output through the learning rate. Shares the recursive forecasting
//! scheme with the forest so multi-day horizons stay feature-consistent.

use crate::calendar::HolidayCalendar;
use crate::core::series::DailySeries;
use crate::error::{PipelineError, Result};
use crate::features::{feature_row, training_matrix, FEATURE_COUNT};
use crate::models::tree::{RegressionTree, TreeConfig};
use crate::models::{Forecaster, ModelKind};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const NUM_ROUNDS: usize = 80;
const LEARNING_RATE: f64 = 0.1;
/// Fraction of rows sampled per round, without replacement.
const SUBSAMPLE: f64 = 0.8;

const TREE_CONFIG: TreeConfig = TreeConfig {
    max_depth: 3,
    min_samples_split: 4,
    max_thresholds: 16,
};

#[derive(Debug, Clone)]
struct FittedState {
    base: f64,
    trees: Vec<RegressionTree>,
    history: Vec<f64>,
    last_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct GradientBoosting {
    calendar: HolidayCalendar,
    seed: u64,
    state: Option<FittedState>,
}

impl GradientBoosting {
    pub fn new(calendar: HolidayCalendar, seed: u64) -> Self {
        Self {
            calendar,
            seed,
            state: None,
        }
    }

    fn fit_error(&self, reason: &str) -> PipelineError {
        PipelineError::ModelFit {
            kind: self.kind(),
            reason: reason.to_string(),
        }
    }

    fn score_row(&self, state: &FittedState, row: &[f64]) -> f64 {
        let boosted: f64 = state.trees.iter().map(|t| t.predict_row(row)).sum();
        state.base + LEARNING_RATE * boosted
    }
}

impl Forecaster for GradientBoosting {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        let (x, y) = training_matrix(series, &self.calendar);
        if x.is_empty() {
            return Err(self.fit_error("needs at least 2 days"));
        }

        let base = y.iter().sum::<f64>() / y.len() as f64;
        let mut residuals: Vec<f64> = y.iter().map(|v| v - base).collect();
        let features: Vec<usize> = (0..FEATURE_COUNT).collect();
        let sample_size = ((x.len() as f64 * SUBSAMPLE).ceil() as usize).max(1);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(NUM_ROUNDS);
        for _ in 0..NUM_ROUNDS {
            let rows = sample_without_replacement(x.len(), sample_size, &mut rng);
            let tree = RegressionTree::fit(&x, &residuals, &rows, &features, &TREE_CONFIG);
            for (row, residual) in x.iter().zip(residuals.iter_mut()) {
                *residual -= LEARNING_RATE * tree.predict_row(row);
            }
            trees.push(tree);
        }

        self.state = Some(FittedState {
            base,
            trees,
            history: series.counts().to_vec(),
            last_date: series.end_date(),
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

        let mut history = state.history.clone();
        let mut forecast = Vec::with_capacity(horizon);
        for k in 1..=horizon {
            let date = state.last_date + Duration::days(k as i64);
            let row = feature_row(date, &history, &self.calendar);
            let value = self.score_row(state, &row).max(0.0);
            history.push(value);
            forecast.push(value);
        }
        Ok(forecast)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::GradientBoosting
    }
}

fn sample_without_replacement(n: usize, k: usize, rng: &mut StdRng) -> Vec<usize> {
    if k >= n {
        return (0..n).collect();
    }
    // Partial Fisher-Yates over an index vector.
    let mut indices: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = rng.gen_range(i..n);
        indices.swap(i, j);
    }
    indices.truncate(k);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Direction;
    use approx::assert_relative_eq;

    fn series(counts: Vec<f64>) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        DailySeries::new(Direction::Inbound, start, counts).unwrap()
    }

    #[test]
    fn flat_series_forecasts_the_level() {
        let mut model = GradientBoosting::new(HolidayCalendar::empty(), 42);
        model.fit(&series(vec![18.0; 30])).unwrap();
        let forecast = model.predict(7).unwrap();
        for value in forecast {
            assert_relative_eq!(value, 18.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn all_zero_series_forecasts_zero() {
        let mut model = GradientBoosting::new(HolidayCalendar::empty(), 42);
        model.fit(&series(vec![0.0; 30])).unwrap();
        assert_eq!(model.predict(28).unwrap(), vec![0.0; 28]);
    }

    #[test]
    fn learns_a_strong_weekly_pattern() {
        // Weekend volume far below weekdays, repeated for 8 weeks.
        let week = [50.0, 50.0, 50.0, 50.0, 50.0, 5.0, 5.0];
        let counts: Vec<f64> = week.iter().cycle().take(56).copied().collect();
        let mut model = GradientBoosting::new(HolidayCalendar::empty(), 42);
        model.fit(&series(counts)).unwrap();

        // 2024-02-26 is a Monday, so days 5 and 6 of the forecast land on
        // the weekend.
        let forecast = model.predict(7).unwrap();
        assert!(forecast[0] > forecast[5]);
        assert!(forecast[0] > forecast[6]);
    }

    #[test]
    fn same_seed_reproduces_the_forecast() {
        let counts: Vec<f64> = (0..40).map(|i| 10.0 + (i % 7) as f64).collect();
        let mut a = GradientBoosting::new(HolidayCalendar::empty(), 9);
        let mut b = GradientBoosting::new(HolidayCalendar::empty(), 9);
        a.fit(&series(counts.clone())).unwrap();
        b.fit(&series(counts)).unwrap();
        assert_eq!(a.predict(14).unwrap(), b.predict(14).unwrap());
    }

    #[test]
    fn predict_before_fit_fails() {
        let model = GradientBoosting::new(HolidayCalendar::empty(), 42);
        assert!(matches!(
            model.predict(7),
            Err(PipelineError::ModelFit { .. })
        ));
    }
}
