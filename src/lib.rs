pub mod cli;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use config::PipelineConfig;
pub use pipeline::{Pipeline, RunSummary};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui, UiApp};
