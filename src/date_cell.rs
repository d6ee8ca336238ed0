use crate::models::{CellValue, ParsedDate};
use chrono::{NaiveDate, NaiveTime};

/// Accepted text layouts, tried in order
const TEXT_DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%d-%m-%Y"];

/// Reads a registration or renewal date out of a cell.
///
/// Native date cells pass through untouched. Text must be exactly
/// `DD/MM/YYYY` or `DD-MM-YYYY` with nothing around it; anything else,
/// including numbers that merely look like Excel serials, is unparseable.
pub fn parse_cell(value: &CellValue) -> ParsedDate {
    match value {
        CellValue::DateTime(dt) => ParsedDate::Date(*dt),
        CellValue::Text(s) => parse_text(s),
        CellValue::Empty | CellValue::Number(_) | CellValue::Bool(_) | CellValue::Error(_) => {
            ParsedDate::Unparseable
        }
    }
}

fn parse_text(raw: &str) -> ParsedDate {
    // chrono skips whitespace before numeric fields, so reject it up front
    if !raw.bytes().all(|b| b.is_ascii_digit() || b == b'/' || b == b'-') {
        return ParsedDate::Unparseable;
    }
    if !has_four_digit_year(raw) {
        return ParsedDate::Unparseable;
    }

    TEXT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map(|date| ParsedDate::Date(date.and_time(NaiveTime::MIN)))
        .unwrap_or(ParsedDate::Unparseable)
}

/// chrono's `%Y` takes any width, so "15/03/24" would become year 24
fn has_four_digit_year(s: &str) -> bool {
    match s.rfind(['/', '-']) {
        Some(pos) => {
            let year = &s[pos + 1..];
            year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn date(y: i32, m: u32, d: u32) -> ParsedDate {
        ParsedDate::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN))
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn slash_and_dash_layouts() {
        assert_eq!(parse_cell(&text("15/03/2024")), date(2024, 3, 15));
        assert_eq!(parse_cell(&text("15-03-2024")), date(2024, 3, 15));
        assert_eq!(parse_cell(&text("4/3/2024")), date(2024, 3, 4));
    }

    #[test]
    fn surrounding_or_inner_whitespace_is_rejected() {
        for raw in [
            " 04/03/2024",
            "04/03/2024 ",
            " 04/03/2024 ",
            "04/03/2024\n",
            "\t04-03-2024",
            "04/ 03/2024",
            "04 /03/2024",
        ] {
            assert_eq!(parse_cell(&text(raw)), ParsedDate::Unparseable, "{raw:?}");
        }
    }

    #[test]
    fn other_layouts_are_rejected() {
        for raw in [
            "2024/03/15",
            "2024-03-15",
            "03.15.2024",
            "15/03/24",
            "15/03/+2024",
            "15/03/2024 10:00",
            "31/02/2024",
            "13/13/2024",
            "hola",
            "",
            "   ",
        ] {
            assert_eq!(parse_cell(&text(raw)), ParsedDate::Unparseable, "{raw:?}");
        }
    }

    #[test]
    fn native_dates_pass_through_verbatim() {
        let dt = NaiveDateTime::parse_from_str("2024-03-06 17:45:12", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(parse_cell(&CellValue::DateTime(dt)), ParsedDate::Date(dt));
    }

    #[test]
    fn non_text_values_are_unparseable() {
        assert_eq!(parse_cell(&CellValue::Empty), ParsedDate::Unparseable);
        assert_eq!(parse_cell(&CellValue::Number(45356.0)), ParsedDate::Unparseable);
        assert_eq!(parse_cell(&CellValue::Bool(true)), ParsedDate::Unparseable);
        assert_eq!(
            parse_cell(&CellValue::Error("#N/A".to_string())),
            ParsedDate::Unparseable
        );
    }
}
