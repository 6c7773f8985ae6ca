//! Field mapper: resolves which source columns carry the required
//! logical fields.
//!
//! Scoring follows the original detector's split: a header-name synonym
//! match contributes up to 0.4, and content sniffing over a sample of the
//! column's values contributes up to 0.6 in proportion to the fraction of
//! sampled values whose shape is compatible with the field. A column is a
//! candidate once the combined score reaches the configured threshold;
//! exact ties go to the left-most column.

use crate::config::PipelineConfig;
use crate::core::record::{is_phone_like, parse_answered, parse_timestamp, Direction};
use crate::error::{PipelineError, Result};
use crate::ingest::InputTable;
use serde::Serialize;

const NAME_WEIGHT: f64 = 0.4;
const CONTENT_WEIGHT: f64 = 0.6;

/// The four logical fields every input must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalField {
    Timestamp,
    Phone,
    Direction,
    Answered,
}

impl LogicalField {
    pub const ALL: [LogicalField; 4] = [
        LogicalField::Timestamp,
        LogicalField::Phone,
        LogicalField::Direction,
        LogicalField::Answered,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LogicalField::Timestamp => "timestamp",
            LogicalField::Phone => "phone",
            LogicalField::Direction => "direction",
            LogicalField::Answered => "answered",
        }
    }
}

impl std::fmt::Display for LogicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved source column index per logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    pub timestamp: usize,
    pub phone: usize,
    pub direction: usize,
    pub answered: usize,
}

impl FieldMapping {
    pub fn column(&self, field: LogicalField) -> usize {
        match field {
            LogicalField::Timestamp => self.timestamp,
            LogicalField::Phone => self.phone,
            LogicalField::Direction => self.direction,
            LogicalField::Answered => self.answered,
        }
    }
}

/// Resolve all four logical fields, or fail naming every missing one.
pub fn map_fields(table: &InputTable, config: &PipelineConfig) -> Result<FieldMapping> {
    if table.headers.is_empty() {
        return Err(PipelineError::FieldMapping {
            missing: LogicalField::ALL.to_vec(),
        });
    }

    let mut resolved = [None; 4];
    let mut missing = Vec::new();

    for (slot, field) in LogicalField::ALL.iter().enumerate() {
        match best_column(table, *field, config) {
            Some(column) => resolved[slot] = Some(column),
            None => missing.push(*field),
        }
    }

    if !missing.is_empty() {
        return Err(PipelineError::FieldMapping { missing });
    }

    let mapping = FieldMapping {
        timestamp: resolved[0].unwrap(),
        phone: resolved[1].unwrap(),
        direction: resolved[2].unwrap(),
        answered: resolved[3].unwrap(),
    };
    tracing::debug!(
        timestamp = mapping.timestamp,
        phone = mapping.phone,
        direction = mapping.direction,
        answered = mapping.answered,
        "field mapping resolved"
    );
    Ok(mapping)
}

fn best_column(table: &InputTable, field: LogicalField, config: &PipelineConfig) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (column, header) in table.headers.iter().enumerate() {
        let score = column_score(table, column, header, field, config);
        if score < config.mapper_threshold {
            continue;
        }
        // Strict comparison keeps the left-most column on an exact tie.
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((column, score)),
        }
    }

    best.map(|(column, _)| column)
}

fn column_score(
    table: &InputTable,
    column: usize,
    header: &str,
    field: LogicalField,
    config: &PipelineConfig,
) -> f64 {
    let normalized = header.trim().to_lowercase();
    let synonyms = match field {
        LogicalField::Timestamp => &config.synonyms.timestamp,
        LogicalField::Phone => &config.synonyms.phone,
        LogicalField::Direction => &config.synonyms.direction,
        LogicalField::Answered => &config.synonyms.answered,
    };
    let name_score = if synonyms.iter().any(|s| normalized.contains(s.as_str())) {
        NAME_WEIGHT
    } else {
        0.0
    };

    name_score + CONTENT_WEIGHT * content_match_ratio(table, column, field, config.mapper_sample)
}

/// Fraction of sampled non-empty values whose runtime shape is compatible
/// with the field. A high-scoring name with incompatible values is thereby
/// rejected before it can shadow the real column.
fn content_match_ratio(
    table: &InputTable,
    column: usize,
    field: LogicalField,
    sample: usize,
) -> f64 {
    let mut seen = 0usize;
    let mut matched = 0usize;

    for row in 0..table.rows.len() {
        if seen >= sample {
            break;
        }
        let cell = table.cell(row, column);
        if cell.trim().is_empty() {
            continue;
        }
        seen += 1;
        let compatible = match field {
            LogicalField::Timestamp => parse_timestamp(cell).is_some(),
            LogicalField::Phone => is_phone_like(cell),
            LogicalField::Direction => Direction::parse(cell).is_some(),
            LogicalField::Answered => parse_answered(cell).is_some(),
        };
        if compatible {
            matched += 1;
        }
    }

    if seen == 0 {
        0.0
    } else {
        matched as f64 / seen as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> InputTable {
        InputTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn maps_spanish_headers() {
        let t = table(
            &["Fecha", "Telefono", "Sentido", "Atendida"],
            &[
                &["02-01-2024 09:15:00", "+56912345678", "in", "si"],
                &["03-01-2024 10:00:00", "223456789", "out", "no"],
            ],
        );
        let mapping = map_fields(&t, &PipelineConfig::default()).unwrap();
        assert_eq!(mapping.timestamp, 0);
        assert_eq!(mapping.phone, 1);
        assert_eq!(mapping.direction, 2);
        assert_eq!(mapping.answered, 3);
    }

    #[test]
    fn maps_english_headers_in_any_order() {
        let t = table(
            &["Answered", "Call Type", "Caller Number", "Timestamp"],
            &[
                &["yes", "inbound", "4155551234", "2024-01-02 09:15:00"],
                &["no", "outbound", "4155559876", "2024-01-03 10:00:00"],
            ],
        );
        let mapping = map_fields(&t, &PipelineConfig::default()).unwrap();
        assert_eq!(mapping.answered, 0);
        assert_eq!(mapping.direction, 1);
        assert_eq!(mapping.phone, 2);
        assert_eq!(mapping.timestamp, 3);
    }

    #[test]
    fn content_sniffing_overrides_a_misleading_name() {
        // Two date-named columns; only the second holds parseable dates.
        let t = table(
            &["fecha_texto", "fecha", "Telefono", "Sentido", "Atendida"],
            &[
                &["segunda semana", "02-01-2024 09:15:00", "1234567", "in", "si"],
                &["tercera semana", "03-01-2024 09:15:00", "1234568", "out", "no"],
            ],
        );
        let mapping = map_fields(&t, &PipelineConfig::default()).unwrap();
        assert_eq!(mapping.timestamp, 1);
    }

    #[test]
    fn exact_tie_prefers_leftmost_column() {
        // Identical header and identical content in both phone columns.
        let t = table(
            &["Fecha", "Telefono", "Telefono", "Sentido", "Atendida"],
            &[&["02-01-2024 09:15:00", "1234567", "7654321", "in", "si"]],
        );
        let mapping = map_fields(&t, &PipelineConfig::default()).unwrap();
        assert_eq!(mapping.phone, 1);
    }

    #[test]
    fn missing_phone_column_is_named_in_the_error() {
        let t = table(
            &["Fecha", "Observaciones", "Sentido", "Atendida"],
            &[
                &["02-01-2024 09:15:00", "cliente molesto", "in", "si"],
                &["03-01-2024 09:15:00", "sin comentarios", "out", "no"],
            ],
        );
        let err = map_fields(&t, &PipelineConfig::default()).unwrap_err();
        match err {
            PipelineError::FieldMapping { missing } => {
                assert_eq!(missing, vec![LogicalField::Phone]);
            }
            other => panic!("expected FieldMapping, got {other:?}"),
        }
    }

    #[test]
    fn empty_header_row_misses_everything() {
        let t = table(&[], &[]);
        let err = map_fields(&t, &PipelineConfig::default()).unwrap_err();
        match err {
            PipelineError::FieldMapping { missing } => {
                assert_eq!(missing.len(), 4);
            }
            other => panic!("expected FieldMapping, got {other:?}"),
        }
    }
}
