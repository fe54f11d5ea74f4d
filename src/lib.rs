//! Datascribe: automated dataset analysis and reporting library

pub mod charts;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod loader;
pub mod logger;
pub mod metrics;
pub mod narrative;
pub mod profiler;
pub mod report;

// Re-exports
pub use charts::{ChartArtifact, ChartKind};
pub use config::{AppConfig, ConfigError};
pub use dataset::{Column, ColumnKind, Dataset};
pub use errors::AppError;
pub use loader::LoadError;
pub use narrative::{Narrative, NarrativeClient, NarrativeError};
pub use profiler::{ColumnProfile, ColumnStats, CorrelationMatrix, ProfileSummary};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use prometheus::Registry;
use tokio::task;
use tracing::{info, warn};

use crate::metrics::Metrics;

/// Main library interface: one instance per configuration, reusable across
/// datasets.
pub struct Datascribe {
    config: AppConfig,
    narrator: NarrativeClient,
    metrics: Metrics,
    registry: Registry,
}

impl Datascribe {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let registry = Registry::new();
        let metrics = Metrics::new(&registry);
        let narrator = NarrativeClient::new(&config)?;
        Ok(Self {
            config,
            narrator,
            metrics,
            registry,
        })
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Analyze one CSV file end to end: load, profile, render charts,
    /// synthesize the narrative and write the report into a directory named
    /// after the file stem.
    ///
    /// Charts and narrative degrade independently; only loading, directory
    /// creation and the final write can fail the run.
    pub async fn analyze_file(&self, path: &Path) -> Result<RunSummary, AppError> {
        let dataset = Arc::new(loader::load(path)?);
        self.metrics.datasets_loaded.inc();
        info!(
            "Dataset loaded: {} rows, {} columns",
            dataset.row_count(),
            dataset.column_count()
        );

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());
        let out_dir = self.config.output_root.join(&stem);
        std::fs::create_dir_all(&out_dir)?;

        let profile = Arc::new(profiler::profile(&dataset));
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| stem.clone());

        // Charts are CPU-and-disk bound, the narrative is network bound;
        // they run concurrently and fail independently.
        let charts_task = task::spawn_blocking({
            let dataset = Arc::clone(&dataset);
            let profile = Arc::clone(&profile);
            let out_dir = out_dir.clone();
            move || charts::render_all(&dataset, &profile, &out_dir)
        });
        self.metrics.llm_requests.inc();
        let narrative_task = self.narrator.synthesize(&file_name, &profile);

        let (charts_result, narrative) = tokio::join!(charts_task, narrative_task);
        let artifacts = match charts_result {
            Ok(artifacts) => artifacts,
            Err(err) => {
                warn!("Chart rendering task failed: {}", err);
                Vec::new()
            }
        };
        self.metrics.charts_rendered.inc_by(artifacts.len() as u64);
        if narrative.degraded {
            self.metrics.llm_failures.inc();
        }

        let document = report::assemble(&profile, &narrative.text, &artifacts);
        let report_path = report::write_report(&out_dir, &document)?;

        info!(
            "Analysis complete: {} rows, {} columns, {} charts",
            dataset.row_count(),
            dataset.column_count(),
            artifacts.len()
        );

        Ok(RunSummary {
            report_path,
            rows: dataset.row_count(),
            columns: dataset.column_count(),
            charts: artifacts,
            narrative_degraded: narrative.degraded,
        })
    }
}

/// Result of one analysis run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Where the report was written
    pub report_path: PathBuf,
    /// Rows in the dataset
    pub rows: usize,
    /// Columns in the dataset
    pub columns: usize,
    /// Charts that actually rendered, in policy order
    pub charts: Vec<ChartArtifact>,
    /// Whether the narrative fell back to the placeholder
    pub narrative_degraded: bool,
}
