use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single table value. `Missing` is distinct from both `Text("")` and `Number(0.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
    pub cells: Vec<Cell>,
}

impl Column {
    /// Builds a column and infers its type: numeric when every present cell is a
    /// number (an all-missing column counts as numeric), text otherwise. Text
    /// columns never hold `Number` cells.
    pub fn infer(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        let numeric = cells
            .iter()
            .all(|c| matches!(c, Cell::Missing | Cell::Number(_)));

        if numeric {
            return Self {
                name: name.into(),
                kind: ColumnType::Numeric,
                cells,
            };
        }

        let cells = cells
            .into_iter()
            .map(|c| match c {
                Cell::Number(n) => Cell::Text(n.to_string()),
                other => other,
            })
            .collect();

        Self {
            name: name.into(),
            kind: ColumnType::Text,
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }

    pub fn non_null_count(&self) -> usize {
        self.len() - self.missing_count()
    }

    /// Schema label for the column: `object`, `int64` or `float64`.
    pub fn dtype(&self) -> &'static str {
        match self.kind {
            ColumnType::Text => "object",
            ColumnType::Numeric => {
                let integral = self
                    .cells
                    .iter()
                    .all(|c| matches!(c, Cell::Number(n) if n.fract() == 0.0));
                if integral && !self.is_empty() {
                    "int64"
                } else {
                    "float64"
                }
            }
        }
    }
}

/// Ordered named columns of equal length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(EtlError::ShapeError {
                    message: format!(
                        "column '{}' has {} cells, expected {}",
                        bad.name,
                        bad.len(),
                        expected
                    ),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn row(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.columns.iter().map(move |c| &c.cells[index])
    }

    pub fn row_has_missing(&self, index: usize) -> bool {
        self.row(index).any(Cell::is_missing)
    }

    /// New dataset holding the given rows, in the given order. Column types
    /// are carried over as-is.
    pub fn take_rows(&self, indices: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                cells: indices.iter().map(|&i| c.cells[i].clone()).collect(),
            })
            .collect();
        Self { columns }
    }
}

/// Per-column line of the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnType,
    pub dtype: String,
    pub non_null: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub rows: usize,
    pub columns: usize,
    pub column_summaries: Vec<ColumnSummary>,
    pub total_missing: usize,
    pub duplicate_rows: usize,
    pub schema: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleaningOperation {
    RemoveMissing,
    HandleMissing,
    RemoveDuplicates,
}

impl CleaningOperation {
    pub const ALL: [CleaningOperation; 3] = [
        CleaningOperation::RemoveMissing,
        CleaningOperation::HandleMissing,
        CleaningOperation::RemoveDuplicates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CleaningOperation::RemoveMissing => "remove-missing",
            CleaningOperation::HandleMissing => "handle-missing",
            CleaningOperation::RemoveDuplicates => "remove-duplicates",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            CleaningOperation::RemoveMissing => "Missing values removed!",
            CleaningOperation::HandleMissing => "Missing values handled!",
            CleaningOperation::RemoveDuplicates => "Duplicate records removed!",
        }
    }
}

impl fmt::Display for CleaningOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CleaningOperation {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "remove-missing" => Ok(CleaningOperation::RemoveMissing),
            "handle-missing" => Ok(CleaningOperation::HandleMissing),
            "remove-duplicates" => Ok(CleaningOperation::RemoveDuplicates),
            _ => Err(EtlError::InvalidConfigValueError {
                field: "operation".to_string(),
                value: s.to_string(),
                reason: "expected remove-missing, handle-missing or remove-duplicates"
                    .to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            _ => Err(EtlError::InvalidConfigValueError {
                field: "format".to_string(),
                value: s.to_string(),
                reason: "expected csv or xlsx".to_string(),
            }),
        }
    }
}

/// What to do with trailing missing values in a numeric column once
/// interpolation has run out of right-hand neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationBoundary {
    #[default]
    LeaveMissing,
    CarryForward,
}

/// Output of one cleaning action, ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningResult {
    pub dataset: Dataset,
    pub operation: CleaningOperation,
    pub format: ExportFormat,
    pub filename: String,
    pub content_type: &'static str,
}

/// Encoded bytes of a cleaning result plus where they went.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Cell {
        Cell::Number(v)
    }

    #[test]
    fn test_ragged_columns_are_rejected() {
        let a = Column::infer("a", vec![num(1.0), num(2.0)]);
        let b = Column::infer("b", vec![num(1.0)]);
        assert!(matches!(
            Dataset::new(vec![a, b]),
            Err(EtlError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_infer_mixed_column_becomes_text() {
        let col = Column::infer(
            "mixed",
            vec![num(3.0), Cell::Text("x".into()), Cell::Missing],
        );
        assert_eq!(col.kind, ColumnType::Text);
        assert_eq!(col.cells[0], Cell::Text("3".into()));
        assert_eq!(col.cells[2], Cell::Missing);
    }

    #[test]
    fn test_all_missing_column_is_numeric() {
        let col = Column::infer("empty", vec![Cell::Missing, Cell::Missing]);
        assert_eq!(col.kind, ColumnType::Numeric);
        assert_eq!(col.dtype(), "float64");
    }

    #[test]
    fn test_dtype_labels() {
        assert_eq!(Column::infer("i", vec![num(1.0), num(2.0)]).dtype(), "int64");
        assert_eq!(Column::infer("f", vec![num(1.5), num(2.0)]).dtype(), "float64");
        assert_eq!(Column::infer("g", vec![num(1.0), Cell::Missing]).dtype(), "float64");
        assert_eq!(Column::infer("t", vec![Cell::Text("a".into())]).dtype(), "object");
    }

    #[test]
    fn test_take_rows_keeps_order() {
        let ds = Dataset::new(vec![Column::infer(
            "n",
            vec![num(10.0), num(20.0), num(30.0)],
        )])
        .unwrap();
        let taken = ds.take_rows(&[2, 0]);
        assert_eq!(taken.columns()[0].cells, vec![num(30.0), num(10.0)]);
    }

    #[test]
    fn test_operation_and_format_parsing() {
        assert_eq!(
            "remove_duplicates".parse::<CleaningOperation>().unwrap(),
            CleaningOperation::RemoveDuplicates
        );
        assert!("drop-everything".parse::<CleaningOperation>().is_err());
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert!("parquet".parse::<ExportFormat>().is_err());
    }
}
