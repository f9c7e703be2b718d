//! Ranking of the largest emitters for the charts

use crate::writer::CleanedRow;

/// What the interactive display shows once a run is finished
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub title: String,
    /// Largest emitters, descending
    pub bars: Vec<(String, f64)>,
    /// Percentage share of each of the top few within their own total
    pub shares: Vec<(String, f64)>,
}

impl ChartView {
    pub fn new(rows: &[CleanedRow], top_bar: usize, top_pie: usize, year: i64) -> Self {
        let top = top_emitters(rows, top_bar);
        let pie = &top[..top_pie.min(top.len())];

        Self {
            title: format!("Top {} CO₂ Emitters ({})", top.len(), year),
            bars: top
                .iter()
                .map(|row| (row.country.clone(), row.emission_value))
                .collect(),
            shares: shares(pie),
        }
    }
}

/// The `n` rows with the highest emission value, descending. Ties keep table order.
pub fn top_emitters(rows: &[CleanedRow], n: usize) -> Vec<CleanedRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.emission_value.total_cmp(&a.emission_value));
    sorted.truncate(n);
    sorted
}

/// Each row's percentage of the rows' combined emissions; all zero when the total is zero
pub fn shares(rows: &[CleanedRow]) -> Vec<(String, f64)> {
    let total: f64 = rows.iter().map(|row| row.emission_value).sum();

    rows.iter()
        .map(|row| {
            let percent = if total > 0.0 {
                row.emission_value / total * 100.0
            } else {
                0.0
            };
            (row.country.clone(), percent)
        })
        .collect()
}
