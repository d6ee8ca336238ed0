pub mod config;
pub mod data_processor;
pub mod date_cell;
pub mod error;
pub mod excel_parser;
pub mod models;
pub mod report_writer;
pub mod week_window;

use anyhow::{Context, Result};
use config::ResolvedConfig;
use data_processor::{run_batch, scan_excel_files, XlsxStore};
use models::{DateWindow, RunReport, RunSummary};
use tracing::{info, warn};

pub use data_processor::filter_table;
pub use date_cell::parse_cell;
pub use week_window::compute_last_week_window;

/// Scans the input folder and extracts last week's rows from every file
pub fn run(config: &ResolvedConfig, window: DateWindow) -> Result<RunReport> {
    info!(
        from = %window.start.format("%d/%m/%Y"),
        to = %window.end.format("%d/%m/%Y"),
        "looking for last week's rows"
    );
    info!(input = %config.input_dir.display(), output = %config.output_dir.display(), "folders");

    let files = scan_excel_files(&config.input_dir, &config.extensions, config.recursive)
        .with_context(|| format!("cannot scan {:?}", config.input_dir))?;

    if files.is_empty() {
        warn!(
            folder = %config.input_dir.display(),
            extensions = %config.extensions.join(","),
            "no spreadsheet files found"
        );
    } else {
        info!("found {} spreadsheet file(s)", files.len());
    }

    let report = run_batch(&XlsxStore, &files, &config.output_dir, &window);
    log_summary(&report.summary);

    Ok(report)
}

fn log_summary(summary: &RunSummary) {
    info!("files processed: {}", summary.files_seen);
    info!("files with new data: {}", summary.files_with_matches);
    info!("total rows extracted: {}", summary.total_matching_rows);
    if summary.files_failed > 0 {
        warn!("files with errors: {}", summary.files_failed);
    }
    info!("done");
}
