//! Bagged regression trees over calendar features.
//!
//! Each tree trains on a bootstrap resample of the day rows and a random
//! subset of the features. Forecasting is recursive: every predicted day
//! is appended to the history so the rolling-mean features of later days
//! see it.

use crate::calendar::HolidayCalendar;
use crate::core::series::DailySeries;
use crate::error::{PipelineError, Result};
use crate::features::{feature_row, training_matrix, FEATURE_COUNT};
use crate::models::tree::{RegressionTree, TreeConfig};
use crate::models::{Forecaster, ModelKind};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const NUM_TREES: usize = 60;
const FEATURES_PER_TREE: usize = FEATURE_COUNT * 2 / 3;

const TREE_CONFIG: TreeConfig = TreeConfig {
    max_depth: 8,
    min_samples_split: 4,
    max_thresholds: 16,
};

#[derive(Debug, Clone)]
struct FittedState {
    trees: Vec<RegressionTree>,
    history: Vec<f64>,
    last_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    calendar: HolidayCalendar,
    seed: u64,
    state: Option<FittedState>,
}

impl RandomForest {
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
}

impl Forecaster for RandomForest {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        let (x, y) = training_matrix(series, &self.calendar);
        if x.is_empty() {
            return Err(self.fit_error("needs at least 2 days"));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(NUM_TREES);
        for _ in 0..NUM_TREES {
            let rows: Vec<usize> = (0..x.len()).map(|_| rng.gen_range(0..x.len())).collect();
            let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
            features.shuffle(&mut rng);
            features.truncate(FEATURES_PER_TREE.max(2));
            features.sort_unstable();
            trees.push(RegressionTree::fit(&x, &y, &rows, &features, &TREE_CONFIG));
        }

        self.state = Some(FittedState {
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
            let sum: f64 = state.trees.iter().map(|t| t.predict_row(&row)).sum();
            let value = (sum / state.trees.len() as f64).max(0.0);
            history.push(value);
            forecast.push(value);
        }
        Ok(forecast)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }
}
