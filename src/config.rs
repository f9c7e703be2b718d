use std::path::{Path, PathBuf};

/// Page holding the per-country emissions table
pub const DEFAULT_URL: &str = "https://www.worldometers.info/co2-emissions/co2-emissions-by-country/";

/// Data vintage assumed for every scraped row; the page does not state it per row
pub const DEFAULT_YEAR: i64 = 2022;

pub const RAW_CSV_FILE: &str = "emissions_raw.csv";
pub const DB_FILE: &str = "emissions.db";
pub const CLEANED_CSV_FILE: &str = "emissions_cleaned.csv";
pub const BAR_CHART_FILE: &str = "top_emitters_bar.png";
pub const PIE_CHART_FILE: &str = "top5_pie.png";
pub const LOG_FILE: &str = "co2_etl.log";

/// Number of countries in the bar chart
pub const TOP_BAR: usize = 10;

/// Number of countries in the pie chart
pub const TOP_PIE: usize = 5;

/// Settings for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub url: String,
    pub year: i64,
    pub output_dir: PathBuf,
    pub top_bar: usize,
    pub top_pie: usize,
    /// Write the PNG charts (needs system fonts)
    pub render_charts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            year: DEFAULT_YEAR,
            output_dir: PathBuf::from("."),
            top_bar: TOP_BAR,
            top_pie: TOP_PIE,
            render_charts: true,
        }
    }
}

impl PipelineConfig {
    /// Default settings writing into `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn raw_csv_path(&self) -> PathBuf {
        self.output_dir.join(RAW_CSV_FILE)
    }

    pub fn db_path(&self) -> PathBuf {
        self.output_dir.join(DB_FILE)
    }

    pub fn cleaned_csv_path(&self) -> PathBuf {
        self.output_dir.join(CLEANED_CSV_FILE)
    }

    pub fn bar_chart_path(&self) -> PathBuf {
        self.output_dir.join(BAR_CHART_FILE)
    }

    pub fn pie_chart_path(&self) -> PathBuf {
        self.output_dir.join(PIE_CHART_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(LOG_FILE)
    }
}
