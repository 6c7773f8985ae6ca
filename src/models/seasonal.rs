//! Seasonal decomposition model: linear trend plus weekly and holiday
//! offsets.
//!
//! The fit is closed form. An OLS line over the day index captures the
//! trend; residuals are averaged per weekday for the weekly component, and
//! the holiday offset is the mean residual left on holiday days after the
//! weekly component is removed.

use crate::calendar::HolidayCalendar;
use crate::core::series::DailySeries;
use crate::error::{PipelineError, Result};
use crate::models::{Forecaster, ModelKind};
use chrono::{Datelike, Duration, NaiveDate};

#[derive(Debug, Clone)]
struct FittedState {
    intercept: f64,
    slope: f64,
    weekday: [f64; 7],
    holiday: f64,
    n: usize,
    last_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct SeasonalDecomposition {
    calendar: HolidayCalendar,
    state: Option<FittedState>,
}

impl SeasonalDecomposition {
    pub fn new(calendar: HolidayCalendar) -> Self {
        Self {
            calendar,
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

impl Forecaster for SeasonalDecomposition {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        let y = series.counts();
        let n = y.len();
        if n < 2 {
            return Err(self.fit_error("needs at least 2 days to fit a trend"));
        }

        // OLS over the day index.
        let nf = n as f64;
        let t_mean = (nf - 1.0) / 2.0;
        let y_mean = y.iter().sum::<f64>() / nf;
        let mut cov = 0.0;
        let mut var = 0.0;
        for (i, value) in y.iter().enumerate() {
            let dt = i as f64 - t_mean;
            cov += dt * (value - y_mean);
            var += dt * dt;
        }
        let slope = cov / var;
        let intercept = y_mean - slope * t_mean;

        // Mean residual per weekday.
        let mut weekday_sum = [0.0f64; 7];
        let mut weekday_n = [0usize; 7];
        for (i, value) in y.iter().enumerate() {
            let residual = value - (intercept + slope * i as f64);
            let dow = series.weekday_at(i).num_days_from_monday() as usize;
            weekday_sum[dow] += residual;
            weekday_n[dow] += 1;
        }
        let mut weekday = [0.0f64; 7];
        for dow in 0..7 {
            if weekday_n[dow] > 0 {
                weekday[dow] = weekday_sum[dow] / weekday_n[dow] as f64;
            }
        }

        // Whatever residual remains on holiday days becomes the offset.
        let mut holiday_sum = 0.0;
        let mut holiday_n = 0usize;
        for (i, value) in y.iter().enumerate() {
            let date = series.date_at(i);
            if self.calendar.is_holiday(date) {
                let dow = date.weekday().num_days_from_monday() as usize;
                holiday_sum += value - (intercept + slope * i as f64) - weekday[dow];
                holiday_n += 1;
            }
        }
        let holiday = if holiday_n > 0 {
            holiday_sum / holiday_n as f64
        } else {
            0.0
        };

        self.state = Some(FittedState {
            intercept,
            slope,
            weekday,
            holiday,
            n,
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

        let mut out = Vec::with_capacity(horizon);
        for k in 1..=horizon {
            let t = (state.n - 1 + k) as f64;
            let date = state.last_date + Duration::days(k as i64);
            let dow = date.weekday().num_days_from_monday() as usize;
            let mut value = state.intercept + state.slope * t + state.weekday[dow];
            if self.calendar.is_holiday(date) {
                value += state.holiday;
            }
            out.push(value.max(0.0));
        }
        Ok(out)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Seasonal
    }
}
