use crate::models::{CellValue, Table};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDateTime, NaiveTime};
use rust_xlsxwriter::*;
use std::io::Write;
use std::path::Path;

/// Suffix appended to the source file stem
pub const OUTPUT_SUFFIX: &str = "_semana_pasada";

/// `clientes.xlsx` -> `clientes_semana_pasada.xlsx`.
///
/// The writer only produces OOXML, so the extension is always `.xlsx`
/// whatever the input format was.
pub fn output_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}{}.xlsx", stem, OUTPUT_SUFFIX)
}

/// Writes the filtered table to `output_file`.
///
/// The workbook is rendered in memory and written through a temp file in
/// the same folder, then renamed into place.
pub fn save_table(table: &Table, output_file: &Path) -> Result<()> {
    let buffer = render_workbook(table)?;

    let dir = output_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("cannot create temp file in {:?}", dir))?;
    tmp.write_all(&buffer)
        .with_context(|| format!("cannot write {:?}", tmp.path()))?;
    tmp.persist(output_file)
        .with_context(|| format!("cannot save {:?}", output_file))?;

    Ok(())
}

fn render_workbook(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_background_color(Color::RGB(0xD3D3D3))
        .set_border(FormatBorder::Thin);

    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let datetime_format = Format::new().set_num_format("dd/mm/yyyy hh:mm:ss");

    for (col, name) in table.columns.iter().enumerate() {
        let col = col as u16;
        worksheet.write_with_format(0, col, name, &header_format)?;
        worksheet.set_column_width(col, column_width(name))?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (idx, values) in table.rows.iter().enumerate() {
        let row = (idx + 1) as u32;

        for (col, value) in values.iter().enumerate() {
            let col = col as u16;
            match value {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(row, col, *n)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                // Excel cannot show dates outside 1900-9999
                CellValue::DateTime(dt) if !(1900..=9999).contains(&dt.year()) => {
                    worksheet.write_string(row, col, date_text(dt))?;
                }
                CellValue::DateTime(dt) => {
                    let format = if dt.time() == NaiveTime::MIN {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet.write_datetime_with_format(row, col, dt, format)?;
                }
                CellValue::Error(e) => {
                    worksheet.write_string(row, col, e)?;
                }
            }
        }
    }

    let buffer = workbook
        .save_to_buffer()
        .context("cannot serialize workbook")?;
    Ok(buffer)
}

fn date_text(dt: &NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%d/%m/%Y").to_string()
    } else {
        dt.format("%d/%m/%Y %H:%M:%S").to_string()
    }
}

/// Header-based width, clamped to something readable
fn column_width(name: &str) -> f64 {
    (name.chars().count() as f64 + 2.0).clamp(10.0, 40.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_from_rs, Data, DataType, Reader, Xlsx};
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn read_back(buffer: Vec<u8>) -> calamine::Range<Data> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(buffer)).unwrap();
        workbook.worksheet_range("Sheet1").unwrap()
    }

    #[test]
    fn dates_keep_their_value() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let with_time = day.and_hms_opt(17, 45, 12).unwrap();
        let table = Table {
            columns: vec!["alta".to_string(), "renovacion".to_string()],
            rows: vec![vec![
                CellValue::DateTime(day.and_time(NaiveTime::MIN)),
                CellValue::DateTime(with_time),
            ]],
        };

        let range = read_back(render_workbook(&table).unwrap());
        let first = range.get_value((1, 0)).unwrap();
        assert!(matches!(first, Data::DateTime(_)));
        assert_eq!(first.as_datetime(), Some(day.and_time(NaiveTime::MIN)));
        assert_eq!(range.get_value((1, 1)).unwrap().as_datetime(), Some(with_time));
    }

    #[test]
    fn dates_before_1900_are_written_as_text() {
        let old = NaiveDate::from_ymd_opt(1850, 6, 15).unwrap();
        let table = Table {
            columns: vec!["fundacion".to_string(), "hora".to_string()],
            rows: vec![vec![
                CellValue::DateTime(old.and_time(NaiveTime::MIN)),
                CellValue::DateTime(old.and_hms_opt(9, 5, 0).unwrap()),
            ]],
        };

        let range = read_back(render_workbook(&table).unwrap());
        assert_eq!(
            range.get_value((1, 0)),
            Some(&Data::String("15/06/1850".to_string()))
        );
        assert_eq!(
            range.get_value((1, 1)),
            Some(&Data::String("15/06/1850 09:05:00".to_string()))
        );
    }

    #[test]
    fn output_name_is_always_xlsx() {
        assert_eq!(
            output_file_name(Path::new("/data/antiguos.xls")),
            "antiguos_semana_pasada.xlsx"
        );
        assert_eq!(
            output_file_name(Path::new("macros.xlsm")),
            "macros_semana_pasada.xlsx"
        );
    }

    #[test]
    fn output_name_keeps_stem() {
        assert_eq!(
            output_file_name(Path::new("/data/alumnos 2024.xlsx")),
            "alumnos 2024_semana_pasada.xlsx"
        );
        assert_eq!(
            output_file_name(Path::new("matriculas.XLSX")),
            "matriculas_semana_pasada.xlsx"
        );
    }
}
