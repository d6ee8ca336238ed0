use crate::models::{CellValue, Table};
use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, ExcelDateTime, Reader};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::path::Path;

/// Loads the first worksheet of a spreadsheet as a table.
///
/// Row 1 holds the headers and data starts on row 2. Column positions are
/// absolute: a sheet whose used range begins at column C still has its
/// first two columns, empty, so index 12 always means column M.
pub fn load_table(file_path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(file_path)
        .with_context(|| format!("cannot open file {:?}", file_path))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .context("workbook has no worksheets")?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("cannot read worksheet '{}'", sheet_name))?;

    let Some((_, start_col)) = range.start() else {
        // Empty sheet
        return Ok(Table::default());
    };
    let leading = start_col as usize;
    let width = leading + range.width();

    let mut rows = range.rows();

    let columns = match rows.next() {
        Some(header) => (0..width)
            .map(|idx| {
                let name = idx
                    .checked_sub(leading)
                    .and_then(|i| header.get(i))
                    .map(|c| c.to_string().trim().to_string())
                    .unwrap_or_default();
                if name.is_empty() {
                    format!("Unnamed: {}", idx)
                } else {
                    name
                }
            })
            .collect(),
        None => return Ok(Table::default()),
    };

    let mut table = Table::new(columns);

    for row in rows {
        let mut values = vec![CellValue::Empty; leading];
        values.extend(row.iter().map(cell_value));
        values.resize(width, CellValue::Empty);

        // Trailing blank rows inside the used range
        if values.iter().all(CellValue::is_empty) {
            continue;
        }
        table.rows.push(values);
    }

    Ok(table)
}

/// Converts a calamine cell into the crate's cell vocabulary
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => excel_datetime(dt),
        Data::DateTimeIso(s) => match parse_iso_datetime(s) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

/// Serial of 9999-12-31 in the 1900 epoch
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

/// Date-formatted numeric cell to a date-time, honouring the workbook's
/// 1900/1904 epoch. Durations and out-of-range serials stay numbers.
fn excel_datetime(dt: &ExcelDateTime) -> CellValue {
    let serial = dt.as_f64();
    if dt.is_datetime() && serial.is_finite() && (0.0..MAX_EXCEL_SERIAL).contains(&serial) {
        if let Some(value) = dt.as_datetime() {
            return CellValue::DateTime(value);
        }
    }
    CellValue::Number(serial)
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}
