//! Extraction of raw rows from the emissions HTML table
//!
//! The page layout is outside our control, so the row source sits behind the
//! [`RowSource`] trait and the pipeline never touches HTML directly.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// Rows with fewer cells are separators or footnotes
pub const MIN_CELLS: usize = 6;

const COUNTRY_CELL: usize = 1;
const EMISSION_CELL: usize = 2;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("Invalid CSS selector for table"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("Invalid CSS selector for tr"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("Invalid CSS selector for td"));

/// One table row before type conversion
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub country: String,
    pub year: i64,
    /// Trimmed cell text with thousands separators removed
    pub emission_text: String,
}

impl RawRow {
    pub fn new(country: impl Into<String>, year: i64, emission_text: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            year,
            emission_text: emission_text.into(),
        }
    }
}

/// Anything that can yield raw emission rows in table order
pub trait RowSource {
    fn rows(&self) -> Box<dyn Iterator<Item = RawRow> + '_>;
}

impl RowSource for Vec<RawRow> {
    fn rows(&self) -> Box<dyn Iterator<Item = RawRow> + '_> {
        Box::new(self.iter().cloned())
    }
}

/// The first `<table>` of an HTML document
pub struct HtmlTable {
    document: Html,
    year: i64,
}

impl HtmlTable {
    /// Parse `html`, failing if it contains no table
    pub fn parse(html: &str, year: i64) -> Result<Self> {
        let document = Html::parse_document(html);
        if document.select(&TABLE).next().is_none() {
            bail!("No <table> element found in document");
        }
        Ok(Self { document, year })
    }
}

impl RowSource for HtmlTable {
    fn rows(&self) -> Box<dyn Iterator<Item = RawRow> + '_> {
        let Some(table) = self.document.select(&TABLE).next() else {
            return Box::new(std::iter::empty());
        };
        let year = self.year;

        // First row is the header
        Box::new(
            table
                .select(&ROW)
                .skip(1)
                .filter_map(move |row| extract_row(row, year)),
        )
    }
}

fn extract_row(row: ElementRef<'_>, year: i64) -> Option<RawRow> {
    let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
    if cells.len() < MIN_CELLS {
        return None;
    }

    let country = cell_text(cells[COUNTRY_CELL]);
    let emission_text = cell_text(cells[EMISSION_CELL]).replace(',', "");

    Some(RawRow {
        country,
        year,
        emission_text,
    })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
