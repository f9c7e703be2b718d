use serde::{Deserialize, Serialize};

use super::table::{RawRow, RowSource};

/// A normalized row; `emission` is `None` when the source text was not numeric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub country: String,
    pub year: i64,
    #[serde(rename = "emission_value")]
    pub emission: Option<f64>,
}

impl From<RawRow> for EmissionRecord {
    fn from(raw: RawRow) -> Self {
        let emission = parse_emission(&raw.emission_text);
        Self {
            country: raw.country,
            year: raw.year,
            emission,
        }
    }
}

/// Parse emission text as a number. Anything that is not a finite decimal is absent.
pub fn parse_emission(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Normalize every row of a source, in order
pub fn normalize(source: &dyn RowSource) -> Vec<EmissionRecord> {
    source.rows().map(EmissionRecord::from).collect()
}
