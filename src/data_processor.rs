use crate::date_cell::parse_cell;
use crate::excel_parser::load_table;
use crate::models::{
    CellValue, DateWindow, FileOutcome, FileReport, ParsedDate, RunReport, RunSummary, Table,
};
use crate::report_writer::{output_file_name, save_table};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, warn};
use walkdir::WalkDir;

/// Column M, registration date
pub const REGISTRATION_COLUMN: usize = 12;
/// Column N, renewal date
pub const RENEWAL_COLUMN: usize = 13;
/// Sheets narrower than this cannot be filtered
pub const MIN_COLUMNS: usize = RENEWAL_COLUMN + 1;

/// Load/store primitive the batch runs against
pub trait TableStore {
    fn load(&self, path: &Path) -> Result<Table>;
    fn save(&self, table: &Table, path: &Path) -> Result<()>;
}

/// Reads with calamine, writes `.xlsx` with rust_xlsxwriter
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxStore;

impl TableStore for XlsxStore {
    fn load(&self, path: &Path) -> Result<Table> {
        load_table(path)
    }

    fn save(&self, table: &Table, path: &Path) -> Result<()> {
        save_table(table, path)
    }
}

/// Lists spreadsheet files in `dir`, sorted by name
pub fn scan_excel_files(dir: &Path, extensions: &[String], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let max_depth = if recursive { usize::MAX } else { 1 };

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "cannot read directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(ext) = path.extension() else {
            continue;
        };
        let ext = ext.to_string_lossy().to_lowercase();
        if !extensions.iter().any(|e| *e == ext) {
            continue;
        }

        // Office lock files
        if entry.file_name().to_string_lossy().starts_with("~$") {
            continue;
        }

        files.push(path.to_path_buf());
    }

    Ok(files)
}

/// Keeps the rows whose registration or renewal date falls inside `window`.
///
/// Tables with fewer than [`MIN_COLUMNS`] columns give an empty result.
pub fn filter_table(table: &Table, window: &DateWindow) -> Table {
    if table.column_count() < MIN_COLUMNS {
        warn!(
            columns = table.column_count(),
            expected = MIN_COLUMNS,
            "not enough columns"
        );
        return Table::default();
    }

    info!(
        registration = %table.columns[REGISTRATION_COLUMN],
        renewal = %table.columns[RENEWAL_COLUMN],
        "date columns"
    );

    let mut filtered = Table::new(table.columns.clone());
    filtered.rows = table
        .rows
        .iter()
        .filter(|row| row_in_window(row, window))
        .cloned()
        .collect();
    filtered
}

fn row_in_window(row: &[CellValue], window: &DateWindow) -> bool {
    let date_at = |idx: usize| {
        row.get(idx)
            .map(parse_cell)
            .unwrap_or(ParsedDate::Unparseable)
    };

    date_at(REGISTRATION_COLUMN).is_within(window) || date_at(RENEWAL_COLUMN).is_within(window)
}

/// Filters every file in order and writes one output per file with matches.
/// A file that fails to load or save is reported and skipped.
pub fn run_batch<S: TableStore + ?Sized>(
    store: &S,
    files: &[PathBuf],
    output_dir: &Path,
    window: &DateWindow,
) -> RunReport {
    let mut summary = RunSummary {
        files_discovered: files.len(),
        ..RunSummary::default()
    };
    let mut reports = Vec::with_capacity(files.len());

    for file in files {
        let outcome = process_file(store, file, output_dir, window, &mut summary);
        reports.push(FileReport {
            file: file.clone(),
            outcome,
        });
    }

    RunReport {
        window: *window,
        output_dir: output_dir.to_path_buf(),
        files: reports,
        summary,
    }
}

fn process_file<S: TableStore + ?Sized>(
    store: &S,
    file: &Path,
    output_dir: &Path,
    window: &DateWindow,
    summary: &mut RunSummary,
) -> FileOutcome {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string());
    let _span = info_span!("file", name = %name).entered();

    let table = match store.load(file) {
        Ok(table) => table,
        Err(e) => {
            let error = format!("{:#}", e);
            error!(%error, "cannot read file, skipping");
            summary.files_failed += 1;
            return FileOutcome::SkippedError { error };
        }
    };
    summary.files_seen += 1;
    info!(rows = table.row_count(), "file read");

    let filtered = filter_table(&table, window);
    if filtered.is_empty() {
        info!("no rows from last week");
        return FileOutcome::SkippedEmpty;
    }

    let rows = filtered.row_count();
    let output = output_dir.join(output_file_name(file));
    match store.save(&filtered, &output) {
        Ok(()) => {
            info!(rows, output = %output.display(), "rows saved");
            summary.files_with_matches += 1;
            summary.total_matching_rows += rows;
            FileOutcome::Written { output, rows }
        }
        Err(e) => {
            let error = format!("{:#}", e);
            error!(%error, output = %output.display(), "cannot write output");
            summary.files_failed += 1;
            FileOutcome::WriteFailed { error }
        }
    }
}
