use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{PipelineConfig, DEFAULT_URL, DEFAULT_YEAR};

#[derive(Parser, Debug)]
#[command(name = "co2-emissions-etl")]
#[command(version, about = "Scrape CO2 emissions by country into SQLite and chart the top emitters")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the page and run the whole pipeline (default)
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Download the emissions page to a local HTML file
    Fetch {
        /// Output HTML file
        #[arg(short, long, default_value = "emissions.html")]
        output: PathBuf,

        /// Page to download
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },

    /// Run the pipeline on a previously downloaded HTML file
    Convert {
        /// Saved HTML document
        input_html: PathBuf,

        #[command(flatten)]
        args: RunArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Page holding the emissions table
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Year recorded against every scraped row
    #[arg(short, long, default_value_t = DEFAULT_YEAR)]
    pub year: i64,

    /// Directory for the CSV, database and chart files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Log to stderr instead of showing the terminal UI
    #[arg(long)]
    pub headless: bool,

    /// Skip writing the PNG charts
    #[arg(long)]
    pub no_charts: bool,
}

impl RunArgs {
    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            url: self.url.clone(),
            year: self.year,
            output_dir: self.output_dir.clone(),
            render_charts: !self.no_charts,
            ..PipelineConfig::default()
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
