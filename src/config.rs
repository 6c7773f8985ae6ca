//! Pipeline configuration.
//!
//! Everything externally supplied lives here: the
//! header synonym lists for field mapping, the MAPE exclusion ceiling,
//! the validation window and minimum training length, the forecast
//! horizon, and the per-model fit timeout.

use std::time::Duration;

/// Accepted header names per logical field, lower-case.
///
/// Source headers may be Spanish or English, so both vocabularies are
/// carried by default. A header matches when it contains one of these
/// synonyms as a substring after normalization.
#[derive(Debug, Clone)]
pub struct FieldSynonyms {
    pub timestamp: Vec<String>,
    pub phone: Vec<String>,
    pub direction: Vec<String>,
    pub answered: Vec<String>,
}

impl Default for FieldSynonyms {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }
        Self {
            timestamp: owned(&[
                "fecha", "date", "datetime", "timestamp", "hora", "time", "created",
            ]),
            phone: owned(&[
                "telefono", "teléfono", "phone", "tel", "numero", "número", "extension",
                "anexo", "caller", "number",
            ]),
            direction: owned(&[
                "sentido", "direction", "direccion", "dirección", "tipo", "type",
                "call_type", "inbound", "outbound",
            ]),
            answered: owned(&[
                "atendida", "answered", "status", "estado", "result", "outcome",
            ]),
        }
    }
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Header synonym lists used by the field mapper.
    pub synonyms: FieldSynonyms,
    /// Minimum combined (name, content) score to accept a column mapping.
    pub mapper_threshold: f64,
    /// How many non-empty values to sample per column when sniffing content.
    pub mapper_sample: usize,
    /// Validation MAPE (percent) above which a model is excluded from the
    /// ensemble entirely.
    pub mape_ceiling: f64,
    /// Trailing days held out for validation.
    pub validation_window: usize,
    /// Minimum days that must remain for training after the split.
    pub min_training_days: usize,
    /// Days to forecast ahead.
    pub horizon: usize,
    /// Wall-clock bound on a single model fit; expiry becomes a
    /// `ModelFitError` for that kind only.
    pub fit_timeout: Duration,
    /// Seed for the tree ensembles, so repeated runs over the same input
    /// produce the same forecasts.
    pub model_seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            synonyms: FieldSynonyms::default(),
            mapper_threshold: 0.3,
            mapper_sample: 100,
            mape_ceiling: 100.0,
            validation_window: 28,
            min_training_days: 14,
            horizon: 28,
            fit_timeout: Duration::from_secs(30),
            model_seed: 42,
        }
    }
}
