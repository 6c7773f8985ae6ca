//! Call record domain types and cell-level parsers.
//!
//! A [`CallRecord`] is only constructed after the field mapper and data
//! auditor succeed; malformed rows never enter the typed domain.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Timestamp formats observed in source exports, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
];

/// Date-only formats, parsed as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Whether a call was placed to or by the call center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Inbound, Direction::Outbound];

    /// Parse a direction cell. Accepts the Spanish and English vocabularies
    /// seen in source exports.
    pub fn parse(cell: &str) -> Option<Direction> {
        match cell.trim().to_lowercase().as_str() {
            "in" | "inbound" | "entrante" | "entrada" => Some(Direction::Inbound),
            "out" | "outbound" | "saliente" | "salida" => Some(Direction::Outbound),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One validated row of the call log. Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub timestamp: NaiveDateTime,
    /// Opaque identifier; never interpreted beyond the mapper's sniffing.
    pub phone: String,
    pub direction: Direction,
    pub answered: bool,
}

impl CallRecord {
    /// The calendar day the call happened on.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Parse a timestamp cell against the known export formats.
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cell, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cell, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parse an answered-status cell.
pub fn parse_answered(cell: &str) -> Option<bool> {
    match cell.trim().to_lowercase().as_str() {
        "si" | "sí" | "yes" | "y" | "true" | "1" | "answered" | "atendida" => Some(true),
        "no" | "false" | "0" | "missed" | "busy" | "failed" | "perdida" => Some(false),
        _ => None,
    }
}

/// Whether a cell looks like a phone number or internal extension:
/// an optional leading `+` followed by 7-15 digits, or a bare 3-4 digit
/// extension.
pub fn is_phone_like(cell: &str) -> bool {
    let cell = cell.trim();
    let digits = cell.strip_prefix('+').unwrap_or(cell);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    matches!(digits.len(), 7..=15 | 3..=4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_accepts_export_formats() {
        let dt = parse_timestamp("02-01-2023 08:08:07").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());

        let dt = parse_timestamp("2024-03-15 14:30:00").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

        // Date-only cells parse as midnight.
        let dt = parse_timestamp("2024-03-15").unwrap();
        assert_eq!(dt.time(), chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap());

        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn direction_accepts_both_vocabularies() {
        assert_eq!(Direction::parse("in"), Some(Direction::Inbound));
        assert_eq!(Direction::parse(" Entrante "), Some(Direction::Inbound));
        assert_eq!(Direction::parse("OUT"), Some(Direction::Outbound));
        assert_eq!(Direction::parse("saliente"), Some(Direction::Outbound));
        assert_eq!(Direction::parse("sideways"), None);
        assert_eq!(Direction::parse(""), None);
    }

    #[test]
    fn answered_accepts_both_vocabularies() {
        assert_eq!(parse_answered("si"), Some(true));
        assert_eq!(parse_answered("Sí"), Some(true));
        assert_eq!(parse_answered("answered"), Some(true));
        assert_eq!(parse_answered("no"), Some(false));
        assert_eq!(parse_answered("MISSED"), Some(false));
        assert_eq!(parse_answered("maybe"), None);
    }

    #[test]
    fn phone_shapes() {
        assert!(is_phone_like("+56912345678"));
        assert!(is_phone_like("2212345"));
        assert!(is_phone_like("1234")); // extension
        assert!(!is_phone_like("12")); // too short
        assert!(!is_phone_like("02-01-2023"));
        assert!(!is_phone_like("hello"));
        assert!(!is_phone_like(""));
    }
}
