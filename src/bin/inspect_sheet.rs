// Shows how a spreadsheet is read: headers, date columns and parsed dates
use anyhow::Result;
use clap::Parser;
use semana_pasada::data_processor::{MIN_COLUMNS, REGISTRATION_COLUMN, RENEWAL_COLUMN};
use semana_pasada::excel_parser::load_table;
use semana_pasada::models::{CellValue, ParsedDate};
use semana_pasada::parse_cell;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "inspect-sheet", about = "Print the header and date columns of a spreadsheet")]
struct Args {
    /// Spreadsheet to inspect
    file: PathBuf,

    /// Number of data rows to show
    #[arg(long, default_value_t = 10)]
    rows: usize,
}

fn describe(value: Option<&CellValue>) -> String {
    let Some(value) = value else {
        return "-".to_string();
    };
    let parsed = match parse_cell(value) {
        ParsedDate::Date(dt) => dt.format("%d/%m/%Y %H:%M:%S").to_string(),
        ParsedDate::Unparseable => "unparseable".to_string(),
    };
    format!("{:?} -> {}", value, parsed)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let table = load_table(&args.file)?;

    println!("columns ({}): {:?}", table.column_count(), table.columns);
    println!("data rows: {}", table.row_count());

    if table.column_count() < MIN_COLUMNS {
        println!(
            "only {} column(s), at least {} needed; this file would be skipped",
            table.column_count(),
            MIN_COLUMNS
        );
        return Ok(());
    }

    println!("registration column: '{}'", table.columns[REGISTRATION_COLUMN]);
    println!("renewal column: '{}'", table.columns[RENEWAL_COLUMN]);

    println!("\nfirst {} row(s):", args.rows.min(table.row_count()));
    for (idx, row) in table.rows.iter().take(args.rows).enumerate() {
        println!("row {}:", idx + 2);
        println!("  registration: {}", describe(row.get(REGISTRATION_COLUMN)));
        println!("  renewal:      {}", describe(row.get(RENEWAL_COLUMN)));
    }

    Ok(())
}
