use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use datascribe::config::load_config;
use datascribe::errors::AppError;
use datascribe::{logger, Datascribe};

#[derive(Parser)]
#[command(name = "datascribe", version)]
struct Cli {
    /// Path to the CSV dataset to analyze
    #[arg(value_name = "dataset.csv")]
    file: Vec<PathBuf>,

    /// Chat-completion endpoint; overrides LLM_ENDPOINT
    #[arg(long)]
    llm_endpoint: Option<String>,

    /// Model name; overrides LLM_MODEL
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    logger::init();
    let cli = Cli::parse();
    let cfg = load_config(&cli.llm_endpoint, &cli.model)?;

    let file = match cli.file.as_slice() {
        [one] => one.clone(),
        _ => {
            error!("Usage: datascribe <dataset.csv>");
            return Err(AppError::Other("expected exactly one dataset path".into()));
        }
    };
    if !file.is_file() {
        error!("Error: The file '{}' does not exist.", file.display());
        return Err(AppError::Other(format!(
            "no such file: {}",
            file.display()
        )));
    }

    let app = Datascribe::new(cfg)?;
    let summary = app.analyze_file(&file).await?;
    info!("Report written to: {}", summary.report_path.display());
    Ok(())
}
