//! Markdown report assembly.
//!
//! Section order is fixed: title, dataset overview, analysis summary,
//! visualizations. Assembly is pure; writing is a separate step.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::charts::ChartArtifact;
use crate::profiler::ProfileSummary;

pub const REPORT_FILE_NAME: &str = "README.md";

/// Render the full report document.
pub fn assemble(profile: &ProfileSummary, narrative: &str, artifacts: &[ChartArtifact]) -> String {
    let mut out = String::new();
    out.push_str("# **Analysis Report**\n\n");

    out.push_str("## **Dataset Overview**\n");
    out.push_str(&format!(
        "The dataset contains {} rows and {} columns. Below is a summary of the data:\n\n",
        profile.row_count,
        profile.columns.len()
    ));
    out.push_str("### Columns:\n");
    for name in profile.column_names() {
        out.push_str(&format!("- {}\n", name));
    }
    out.push('\n');

    out.push_str("## **Analysis Summary**\n");
    out.push_str(narrative);
    out.push_str("\n\n");

    out.push_str("## **Visualizations**\n");
    for artifact in artifacts {
        let file = artifact.file_name();
        out.push_str(&format!("### {}:\n", artifact.title));
        out.push_str(&format!("![{}]({})\n\n", file, file));
    }

    out
}

/// Write the report into `out_dir` and return its path.
pub fn write_report(out_dir: &Path, report: &str) -> io::Result<PathBuf> {
    let path = out_dir.join(REPORT_FILE_NAME);
    fs::write(&path, report)?;
    info!("{} written to: {}", REPORT_FILE_NAME, path.display());
    Ok(path)
}
