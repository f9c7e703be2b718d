use anyhow::{Context, Result};
use co2_emissions_etl::{
    cli::{Cli, Commands, RunArgs},
    fetch::{format_bytes, PageClient},
    logging,
    ConsoleUi, Pipeline, RunSummary, Ui, UiApp,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        None => run(cli.run, None),
        Some(Commands::Run { args }) => run(args, None),
        Some(Commands::Convert { input_html, args }) => run(args, Some(input_html)),
        Some(Commands::Fetch { output, url }) => {
            logging::init_stderr();
            let bytes = PageClient::new()?.download_to(&url, &output)?;
            println!("Saved {} to {:?}", format_bytes(bytes), output);
            Ok(())
        }
    }
}

fn run(args: RunArgs, input_html: Option<PathBuf>) -> Result<()> {
    let start = Instant::now();
    let pipeline = Pipeline::new(args.to_config());

    let summary = if args.headless {
        logging::init_stderr();
        execute(&pipeline, input_html.as_deref(), &mut ConsoleUi::new())?
    } else {
        logging::init_file(&pipeline.config().log_path())?;
        let mut ui = UiApp::new()?;
        let summary = execute(&pipeline, input_html.as_deref(), &mut ui)?;
        ui.restore()?;
        summary
    };

    println!("\n--- Descriptive Statistics ---");
    print!("{}", summary.statistics);

    for chart in &summary.charts {
        println!("Saved chart {:?}", chart);
    }
    println!(
        "\nLoaded {} rows for {} countries ({} missing, replaced with 0) into {:?} in {:.1}s",
        summary.loaded,
        summary.countries,
        summary.cleaned,
        pipeline.config().db_path(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

fn execute(pipeline: &Pipeline, input_html: Option<&Path>, ui: &mut impl Ui) -> Result<RunSummary> {
    match input_html {
        Some(path) => {
            let html = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            pipeline.run_html(&html, ui)
        }
        None => pipeline.run(ui),
    }
}
