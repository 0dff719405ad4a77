//! Turns uploaded bytes into a [`Dataset`].
//!
//! Files whose name ends in `.csv` are read as comma separated text; anything
//! else is handed to the spreadsheet reader and its first sheet is used.

use crate::domain::model::{Cell, Column, Dataset};
use crate::utils::error::{EtlError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::io::Cursor;

/// Tokens read as a missing value, in both CSV fields and spreadsheet strings.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_csv(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".csv")
}

pub fn load(bytes: &[u8], filename: &str) -> Result<Dataset> {
    let dataset = if is_csv(filename) {
        load_csv(bytes, filename)?
    } else {
        load_spreadsheet(bytes, filename)?
    };

    tracing::debug!(
        "Loaded '{}': {} rows x {} columns",
        filename,
        dataset.n_rows(),
        dataset.n_cols()
    );
    Ok(dataset)
}

pub fn load_csv(bytes: &[u8], filename: &str) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| EtlError::parse(filename, e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(EtlError::parse(filename, "No columns to parse from file"));
    }

    let width = headers.len();
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); width];

    for record in reader.records() {
        // csv 已略過真正的空行；單欄檔案的 "" 仍是一筆資料
        let record = record.map_err(|e| EtlError::parse(filename, e.to_string()))?;

        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(EtlError::parse(
                filename,
                format!(
                    "Expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                ),
            ));
        }

        for (idx, values) in raw.iter_mut().enumerate() {
            let field = record.get(idx).filter(|f| !NA_VALUES.contains(f));
            values.push(field.map(str::to_string));
        }
    }

    let columns = dedupe_headers(headers)
        .into_iter()
        .zip(raw)
        .map(|(name, values)| Column::infer(name, text_column_cells(values)))
        .collect();

    Dataset::new(columns)
}

/// Numeric when every present value parses as a number; otherwise all present
/// values stay text.
fn text_column_cells(values: Vec<Option<String>>) -> Vec<Cell> {
    let numeric = values.iter().flatten().all(|v| parse_number(v).is_some());

    values
        .into_iter()
        .map(|v| match v {
            None => Cell::Missing,
            Some(v) if numeric => parse_number(&v).map(Cell::Number).unwrap_or(Cell::Missing),
            Some(v) => Cell::Text(v),
        })
        .collect()
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

pub fn load_spreadsheet(bytes: &[u8], filename: &str) -> Result<Dataset> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| EtlError::parse(filename, e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EtlError::parse(filename, "Workbook has no worksheets"))?
        .map_err(|e| EtlError::parse(filename, e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| EtlError::parse(filename, "No columns to parse from file"))?;

    let headers: Vec<String> = header_row
        .iter()
        .map(|c| match c {
            Data::String(s) => s.clone(),
            Data::Empty => String::new(),
            other => other.to_string(),
        })
        .collect();

    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(idx).map(spreadsheet_cell).unwrap_or(Cell::Missing));
        }
    }

    let columns = dedupe_headers(headers)
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| Column::infer(name, cells))
        .collect();

    Dataset::new(columns)
}

fn spreadsheet_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Missing,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) if f.is_nan() => Cell::Missing,
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) if NA_VALUES.contains(&s.as_str()) => Cell::Missing,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| Cell::Text(format_datetime(d)))
            .unwrap_or_else(|| Cell::Number(dt.as_f64())),
        other => Cell::Text(other.to_string()),
    }
}

fn format_datetime(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Blank headers become `Unnamed: <index>`; repeats get `.1`, `.2`, ... suffixes.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::with_capacity(headers.len());

    for (idx, header) in headers.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            header
        };

        let mut name = base.clone();
        while let Some(count) = seen.get_mut(&name) {
            *count += 1;
            name = format!("{}.{}", base, count);
            if !seen.contains_key(&name) {
                break;
            }
        }
        seen.insert(name.clone(), 0);
        result.push(name);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ColumnType;

    #[test]
    fn test_csv_numeric_and_text_columns() {
        let ds = load(b"name,age\nAlice,30\nBob,\nAlice,30\n", "people.csv").unwrap();
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.column_names(), vec!["name", "age"]);

        let age = ds.column("age").unwrap();
        assert_eq!(age.kind, ColumnType::Numeric);
        assert_eq!(age.cells, vec![Cell::Number(30.0), Cell::Missing, Cell::Number(30.0)]);

        let name = ds.column("name").unwrap();
        assert_eq!(name.kind, ColumnType::Text);
        assert_eq!(name.cells[1], Cell::Text("Bob".into()));
    }

    #[test]
    fn test_csv_na_tokens_are_missing() {
        let ds = load(b"a,b\nNA,x\nnull,N/A\n7,None\n", "tokens.csv").unwrap();
        assert_eq!(ds.column("a").unwrap().missing_count(), 2);
        assert_eq!(ds.column("b").unwrap().missing_count(), 2);
    }

    #[test]
    fn test_csv_short_rows_are_padded() {
        let ds = load(b"a,b,c\n1,2\n", "short.csv").unwrap();
        assert_eq!(ds.column("c").unwrap().cells, vec![Cell::Missing]);
    }

    #[test]
    fn test_single_column_keeps_blank_and_whitespace_rows() {
        let ds = load(b"name\nAlice\n\"\"\n \n\nBob\n", "names.csv").unwrap();
        assert_eq!(
            ds.column("name").unwrap().cells,
            vec![
                Cell::Text("Alice".into()),
                Cell::Missing,
                Cell::Text(" ".into()),
                Cell::Text("Bob".into()),
            ]
        );
    }

    #[test]
    fn test_csv_long_rows_fail() {
        let err = load(b"a,b\n1,2,3\n", "long.csv").unwrap_err();
        assert!(matches!(err, EtlError::ParseError { .. }));
    }

    #[test]
    fn test_empty_csv_fails() {
        assert!(matches!(
            load(b"", "empty.csv"),
            Err(EtlError::ParseError { .. })
        ));
    }

    #[test]
    fn test_header_only_csv_has_zero_rows() {
        let ds = load(b"a,b\n", "header.csv").unwrap();
        assert_eq!(ds.n_rows(), 0);
        assert_eq!(ds.n_cols(), 2);
    }

    #[test]
    fn test_invalid_utf8_csv_fails() {
        let bytes = b"name\n\xff\xfe\n";
        assert!(matches!(
            load(bytes, "bad.csv"),
            Err(EtlError::ParseError { .. })
        ));
    }

    #[test]
    fn test_extension_dispatch_is_case_insensitive() {
        assert!(is_csv("DATA.CSV"));
        assert!(!is_csv("data.xlsx"));
        assert!(!is_csv("csv"));
    }

    #[test]
    fn test_garbage_spreadsheet_fails() {
        let err = load(b"definitely not a workbook", "report.xlsx").unwrap_err();
        assert!(matches!(err, EtlError::ParseError { .. }));
    }

    #[test]
    fn test_spreadsheet_cell_mapping() {
        use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};

        assert_eq!(spreadsheet_cell(&Data::Bool(true)), Cell::Text("TRUE".into()));
        assert_eq!(spreadsheet_cell(&Data::Bool(false)), Cell::Text("FALSE".into()));
        assert_eq!(spreadsheet_cell(&Data::Error(CellErrorType::NA)), Cell::Missing);
        assert_eq!(spreadsheet_cell(&Data::Error(CellErrorType::Div0)), Cell::Missing);
        assert_eq!(spreadsheet_cell(&Data::Float(f64::NAN)), Cell::Missing);
        assert_eq!(spreadsheet_cell(&Data::Empty), Cell::Missing);
        assert_eq!(spreadsheet_cell(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(spreadsheet_cell(&Data::Float(2.5)), Cell::Number(2.5));
        assert_eq!(spreadsheet_cell(&Data::String("n/a".into())), Cell::Missing);
        assert_eq!(spreadsheet_cell(&Data::String("x".into())), Cell::Text("x".into()));

        // 45360.5 是 2024-03-09 中午
        let noon = ExcelDateTime::new(45360.5, ExcelDateTimeType::DateTime, false);
        assert_eq!(
            spreadsheet_cell(&Data::DateTime(noon)),
            Cell::Text("2024-03-09 12:00:00".into())
        );
    }

    #[test]
    fn test_datetime_text_layout() {
        let value = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(format_datetime(value), "2024-03-09 14:05:00");
    }

    #[test]
    fn test_headers_are_deduplicated() {
        let names = dedupe_headers(vec![
            "a".into(),
            "".into(),
            "a".into(),
            "a".into(),
        ]);
        assert_eq!(names, vec!["a", "Unnamed: 1", "a.1", "a.2"]);
    }
}
