//! Forecasting models.
//!
//! Every model implements [`Forecaster`]: fit on a daily series, then
//! predict a number of days past the end of the fitted data. Models are
//! deterministic given the same input; the tree ensembles draw their
//! randomness from fixed seeds.

pub mod autoreg;
pub mod boosting;
pub mod forest;
pub mod seasonal;
mod tree;

pub use autoreg::AutoRegressive;
pub use boosting::GradientBoosting;
pub use forest::RandomForest;
pub use seasonal::SeasonalDecomposition;

use crate::calendar::HolidayCalendar;
use crate::config::PipelineConfig;
use crate::core::series::DailySeries;
use crate::error::Result;
use serde::Serialize;

/// The model families the trainer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Seasonal,
    AutoRegressive,
    RandomForest,
    GradientBoosting,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Seasonal,
        ModelKind::AutoRegressive,
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Seasonal => "seasonal",
            ModelKind::AutoRegressive => "auto_regressive",
            ModelKind::RandomForest => "random_forest",
            ModelKind::GradientBoosting => "gradient_boosting",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A daily-series forecaster.
///
/// `fit` consumes the training series; `predict` extends `horizon` days
/// past the end of whatever was fitted last. Calling `predict` before a
/// successful `fit` is an error, not a panic.
pub trait Forecaster: Send {
    fn fit(&mut self, series: &DailySeries) -> Result<()>;
    fn predict(&self, horizon: usize) -> Result<Vec<f64>>;
    fn kind(&self) -> ModelKind;
}

pub type BoxedForecaster = Box<dyn Forecaster>;

/// Construct an unfitted model of the given kind.
pub fn build_model(
    kind: ModelKind,
    calendar: &HolidayCalendar,
    config: &PipelineConfig,
) -> BoxedForecaster {
    match kind {
        ModelKind::Seasonal => Box::new(SeasonalDecomposition::new(calendar.clone())),
        ModelKind::AutoRegressive => Box::new(AutoRegressive::new()),
        ModelKind::RandomForest => {
            Box::new(RandomForest::new(calendar.clone(), config.model_seed))
        }
        ModelKind::GradientBoosting => {
            Box::new(GradientBoosting::new(calendar.clone(), config.model_seed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_ordered_and_named() {
        assert_eq!(ModelKind::ALL.len(), 4);
        assert_eq!(ModelKind::Seasonal.to_string(), "seasonal");
        assert_eq!(ModelKind::GradientBoosting.name(), "gradient_boosting");
        assert!(ModelKind::Seasonal < ModelKind::GradientBoosting);
    }
}
