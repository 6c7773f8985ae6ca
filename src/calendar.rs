//! Holiday reference calendar.
//!
//! A static date → label table consumed by the trainer when building
//! calendar features. Dates outside the table's range are simply not
//! holidays; the calendar never fails a lookup.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Chilean national holidays 2023-2025, the deployment's operative range.
const CHILEAN_HOLIDAYS: &[(i32, u32, u32, &str)] = &[
    (2023, 1, 1, "Año Nuevo"),
    (2023, 1, 2, "Feriado Adicional por Año Nuevo"),
    (2023, 4, 7, "Viernes Santo"),
    (2023, 4, 8, "Sábado Santo"),
    (2023, 5, 1, "Día Nacional del Trabajo"),
    (2023, 5, 21, "Día de las Glorias Navales"),
    (2023, 6, 21, "Día Nacional de los Pueblos Indígenas"),
    (2023, 6, 26, "San Pedro y San Pablo"),
    (2023, 7, 16, "Día de la Virgen del Carmen"),
    (2023, 8, 15, "Asunción de la Virgen"),
    (2023, 9, 18, "Independencia Nacional"),
    (2023, 9, 19, "Día de las Glorias del Ejército"),
    (2023, 10, 9, "Encuentro de Dos Mundos"),
    (2023, 10, 27, "Día de las Iglesias Evangélicas y Protestantes"),
    (2023, 11, 1, "Día de Todos los Santos"),
    (2023, 12, 8, "Inmaculada Concepción"),
    (2023, 12, 17, "Plebiscito Constitucional"),
    (2023, 12, 25, "Navidad"),
    (2024, 1, 1, "Año Nuevo"),
    (2024, 3, 29, "Viernes Santo"),
    (2024, 3, 30, "Sábado Santo"),
    (2024, 5, 1, "Día Nacional del Trabajo"),
    (2024, 5, 21, "Día de las Glorias Navales"),
    (2024, 6, 9, "Elecciones Primarias"),
    (2024, 6, 20, "Día Nacional de los Pueblos Indígenas"),
    (2024, 6, 29, "San Pedro y San Pablo"),
    (2024, 7, 16, "Día de la Virgen del Carmen"),
    (2024, 8, 15, "Asunción de la Virgen"),
    (2024, 9, 18, "Independencia Nacional"),
    (2024, 9, 19, "Día de las Glorias del Ejército"),
    (2024, 9, 20, "Feriado Adicional por Fiestas Patrias"),
    (2024, 10, 12, "Encuentro de Dos Mundos"),
    (2024, 10, 27, "Elecciones Municipales y Regionales"),
    (2024, 10, 31, "Día de las Iglesias Evangélicas y Protestantes"),
    (2024, 11, 1, "Día de Todos los Santos"),
    (2024, 12, 8, "Inmaculada Concepción"),
    (2024, 12, 25, "Navidad"),
    (2025, 1, 1, "Año Nuevo"),
    (2025, 4, 18, "Viernes Santo"),
    (2025, 4, 19, "Sábado Santo"),
    (2025, 5, 1, "Día Nacional del Trabajo"),
    (2025, 5, 21, "Día de las Glorias Navales"),
    (2025, 6, 20, "Día Nacional de los Pueblos Indígenas"),
    (2025, 6, 29, "San Pedro y San Pablo"),
    (2025, 7, 16, "Día de la Virgen del Carmen"),
    (2025, 8, 15, "Asunción de la Virgen"),
    (2025, 9, 18, "Independencia Nacional"),
    (2025, 9, 19, "Día de las Glorias del Ejército"),
    (2025, 10, 12, "Encuentro de Dos Mundos"),
    (2025, 10, 31, "Día de las Iglesias Evangélicas y Protestantes"),
    (2025, 11, 1, "Día de Todos los Santos"),
    (2025, 12, 8, "Inmaculada Concepción"),
    (2025, 12, 25, "Navidad"),
];

/// Read-only mapping from date to holiday label.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    labels: BTreeMap<NaiveDate, String>,
}

impl HolidayCalendar {
    /// Create an empty calendar (no date is ever a holiday).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a calendar from an external `(date, label)` table.
    pub fn from_table<I>(table: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, String)>,
    {
        Self {
            labels: table.into_iter().collect(),
        }
    }

    /// The built-in Chilean national holiday table, 2023 through 2025.
    pub fn chilean() -> Self {
        let labels = CHILEAN_HOLIDAYS
            .iter()
            .filter_map(|&(y, m, d, label)| {
                NaiveDate::from_ymd_opt(y, m, d).map(|date| (date, label.to_string()))
            })
            .collect();
        Self { labels }
    }

    /// Whether the date is a holiday. Out-of-range dates are not.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.labels.contains_key(&date)
    }

    /// The holiday label for a date, if any.
    pub fn label(&self, date: NaiveDate) -> Option<&str> {
        self.labels.get(&date).map(|s| s.as_str())
    }

    /// Number of holiday entries.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the calendar has no entries.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
