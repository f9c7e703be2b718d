//! The fetch → extract → normalize → load → clean → export → report → chart sequence

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::config::PipelineConfig;
use crate::fetch::PageClient;
use crate::parser::{normalize, EmissionRecord, HtmlTable, RowSource};
use crate::report::{
    remove_stale_chart, render_bar_chart, render_pie_chart, top_emitters, ChartView, Summary,
};
use crate::ui::{Phase, Ui};
use crate::writer::{write_csv, CleanedRow, EmissionStore};

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub extracted: usize,
    /// Records whose emission text was not numeric
    pub missing: usize,
    pub loaded: u64,
    /// Distinct countries stored
    pub countries: u64,
    pub cleaned: usize,
    pub rows: Vec<CleanedRow>,
    pub statistics: Summary,
    pub charts: Vec<PathBuf>,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch the configured page and run every stage on it
    pub fn run(&self, ui: &mut impl Ui) -> Result<RunSummary> {
        ui.set_phase(Phase::Fetching);
        ui.set_info(self.config.url.clone());
        let html = PageClient::new()?.fetch_html(&self.config.url)?;
        ui.log(format!("Fetched {} bytes", html.len()));

        self.run_html(&html, ui)
    }

    /// Run every stage after fetching on an HTML document
    pub fn run_html(&self, html: &str, ui: &mut impl Ui) -> Result<RunSummary> {
        ui.set_phase(Phase::Extracting);
        let table = HtmlTable::parse(html, self.config.year)?;
        self.process(&table, ui)
    }

    /// Run every stage after fetching on any row source
    pub fn process(&self, source: &dyn RowSource, ui: &mut impl Ui) -> Result<RunSummary> {
        fs::create_dir_all(self.config.output_dir())
            .with_context(|| format!("Failed to create {:?}", self.config.output_dir()))?;

        ui.set_phase(Phase::Extracting);
        let records = normalize(source);
        let missing = records.iter().filter(|r| r.emission.is_none()).count();
        info!("extracted {} rows ({} without a numeric emission)", records.len(), missing);
        ui.log(format!("Extracted {} rows, {} missing values", records.len(), missing));

        let (loaded, countries, cleaned, rows) = self.store(&records, ui)?;

        ui.set_phase(Phase::Exporting);
        write_csv(&self.config.raw_csv_path(), &records)?;
        write_csv(&self.config.cleaned_csv_path(), &rows)?;
        ui.log(format!(
            "Wrote {} and {}",
            self.config.raw_csv_path().display(),
            self.config.cleaned_csv_path().display()
        ));

        ui.set_phase(Phase::Reporting);
        let values: Vec<f64> = rows.iter().map(|row| row.emission_value).collect();
        let statistics = Summary::describe(&values);
        info!(count = statistics.count, mean = statistics.mean, "computed statistics");

        ui.set_phase(Phase::Charting);
        let view = ChartView::new(&rows, self.config.top_bar, self.config.top_pie, self.config.year);
        let charts = if self.config.render_charts {
            self.render_charts(&rows, &view)?
        } else {
            remove_stale_chart(&self.config.bar_chart_path())?;
            remove_stale_chart(&self.config.pie_chart_path())?;
            Vec::new()
        };
        for chart in &charts {
            ui.log(format!("Saved {}", chart.display()));
        }
        ui.show_charts(&view)?;

        Ok(RunSummary {
            extracted: records.len(),
            missing,
            loaded,
            countries,
            cleaned,
            rows,
            statistics,
            charts,
        })
    }

    /// Reset, load and clean the database, then read the joined rows back.
    /// The connection lives only for this stage.
    fn store(
        &self,
        records: &[EmissionRecord],
        ui: &mut impl Ui,
    ) -> Result<(u64, u64, usize, Vec<CleanedRow>)> {
        ui.set_phase(Phase::Loading);
        let mut store = EmissionStore::open(&self.config.db_path())?;
        store.reset_schema()?;
        let loaded = store.load(records, ui)?;
        let countries = store.country_count()?;
        ui.log(format!(
            "Loaded {} rows for {} countries into {}",
            loaded,
            countries,
            self.config.db_path().display()
        ));

        ui.set_phase(Phase::Cleaning);
        let cleaned = store.clean()?;
        ui.log(format!("Replaced {} missing values with 0", cleaned));

        let rows = store.cleaned_rows()?;
        store.close()?;

        Ok((loaded, countries, cleaned, rows))
    }

    fn render_charts(&self, rows: &[CleanedRow], view: &ChartView) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let top = top_emitters(rows, self.config.top_bar);
        let bar_path = self.config.bar_chart_path();
        if render_bar_chart(&bar_path, &top, &view.title)? {
            written.push(bar_path);
        }

        let pie = &top[..self.config.top_pie.min(top.len())];
        let pie_path = self.config.pie_chart_path();
        let pie_title = format!("CO₂ Share Among Top {} Emitters", pie.len());
        if render_pie_chart(&pie_path, pie, &pie_title)? {
            written.push(pie_path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RawRow;
    use crate::ui::SilentUi;

    fn pipeline(dir: &std::path::Path) -> Pipeline {
        Pipeline::new(PipelineConfig {
            render_charts: false,
            ..PipelineConfig::in_dir(dir)
        })
    }

    #[test]
    fn test_process_rows() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            RawRow::new("France", 2022, "1234567"),
            RawRow::new("Nowhereland", 2022, "N/A"),
        ];

        let summary = pipeline(dir.path()).process(&rows, &mut SilentUi::new()).unwrap();

        assert_eq!(summary.extracted, 2);
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.countries, 2);
        assert_eq!(summary.cleaned, 1);
        assert_eq!(summary.rows[1].emission_value, 0.0);
        assert_eq!(summary.statistics.count, 2);
        assert!(summary.charts.is_empty());
    }

    #[test]
    fn test_run_html_without_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = pipeline(dir.path()).run_html("<p>moved</p>", &mut SilentUi::new());

        assert!(result.is_err());
        assert!(!dir.path().join("emissions.db").exists());
    }

    #[test]
    fn test_second_run_replaces_first() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path());

        let first = vec![RawRow::new("Peru", 2022, "1"), RawRow::new("Chad", 2022, "2")];
        pipeline.process(&first, &mut SilentUi::new()).unwrap();

        let second = vec![RawRow::new("Mali", 2022, "3")];
        let summary = pipeline.process(&second, &mut SilentUi::new()).unwrap();

        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].country, "Mali");
    }

    fn plant_old_charts(dir: &std::path::Path) {
        std::fs::write(dir.join("top_emitters_bar.png"), b"OLD").unwrap();
        std::fs::write(dir.join("top5_pie.png"), b"OLD").unwrap();
    }

    #[test]
    fn test_empty_run_leaves_no_old_charts() {
        let dir = tempfile::tempdir().unwrap();
        plant_old_charts(dir.path());
        let pipeline = Pipeline::new(PipelineConfig::in_dir(dir.path()));

        let summary = pipeline.process(&Vec::<RawRow>::new(), &mut SilentUi::new()).unwrap();

        assert!(summary.charts.is_empty());
        assert!(!dir.path().join("top_emitters_bar.png").exists());
        assert!(!dir.path().join("top5_pie.png").exists());
    }

    #[test]
    fn test_charts_disabled_removes_old_charts() {
        let dir = tempfile::tempdir().unwrap();
        plant_old_charts(dir.path());

        let rows = vec![RawRow::new("Peru", 2022, "1")];
        pipeline(dir.path()).process(&rows, &mut SilentUi::new()).unwrap();

        assert!(!dir.path().join("top_emitters_bar.png").exists());
        assert!(!dir.path().join("top5_pie.png").exists());
    }
}
