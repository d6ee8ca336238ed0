use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Closed interval covering last week, Monday 00:00 through Sunday 23:59:59.999999
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    /// Inclusive on both ends
    pub fn contains(&self, value: &NaiveDateTime) -> bool {
        self.start <= *value && *value <= self.end
    }
}

/// Raw cell value as read from a spreadsheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Native date cell
    DateTime(NaiveDateTime),
    /// Formula error such as `#N/A`, kept as its display text
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt),
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

/// Outcome of reading a date out of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Date(NaiveDateTime),
    Unparseable,
}

impl ParsedDate {
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            ParsedDate::Date(dt) => Some(*dt),
            ParsedDate::Unparseable => None,
        }
    }

    /// True only for a parsed date inside `window`
    pub fn is_within(&self, window: &DateWindow) -> bool {
        self.as_datetime().is_some_and(|dt| window.contains(&dt))
    }
}

/// A single rectangular sheet: header names plus positional rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Counters accumulated over one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Spreadsheet files found in the input directory
    pub files_discovered: usize,
    /// Files that loaded successfully
    pub files_seen: usize,
    /// Files that produced an output file
    pub files_with_matches: usize,
    /// Rows written across all output files
    pub total_matching_rows: usize,
    /// Files that could not be loaded or written
    pub files_failed: usize,
}

/// Terminal state of one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Written { output: PathBuf, rows: usize },
    SkippedEmpty,
    SkippedError { error: String },
    WriteFailed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub file: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Result of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub window: DateWindow,
    pub output_dir: PathBuf,
    pub files: Vec<FileReport>,
    pub summary: RunSummary,
}

/// Persisted settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Folder holding the source spreadsheets
    #[serde(default)]
    pub input_dir: Option<PathBuf>,
    /// Folder receiving the `_semana_pasada` files
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// File extensions to pick up, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Descend into subfolders of the input directory
    #[serde(default)]
    pub recursive: bool,
}

pub fn default_extensions() -> Vec<String> {
    vec!["xlsx".to_string()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: None,
            extensions: default_extensions(),
            recursive: false,
        }
    }
}
