//! The three cleaning operations. Each one reads a dataset and returns a new
//! one; the input is never modified.

use crate::domain::model::{
    Cell, CleaningOperation, Column, ColumnType, Dataset, InterpolationBoundary,
};
use crate::utils::error::Result;
use std::collections::HashSet;

pub const TEXT_FILL_VALUE: &str = "Unknown";

pub fn apply(
    data: &Dataset,
    operation: CleaningOperation,
    boundary: InterpolationBoundary,
) -> Result<Dataset> {
    let cleaned = match operation {
        CleaningOperation::RemoveMissing => remove_missing(data),
        CleaningOperation::HandleMissing => handle_missing(data, boundary)?,
        CleaningOperation::RemoveDuplicates => remove_duplicates(data),
    };

    tracing::debug!(
        "{}: {} rows -> {} rows",
        operation,
        data.n_rows(),
        cleaned.n_rows()
    );
    Ok(cleaned)
}

/// Drops every row holding at least one missing cell.
pub fn remove_missing(data: &Dataset) -> Dataset {
    let keep: Vec<usize> = (0..data.n_rows())
        .filter(|&i| !data.row_has_missing(i))
        .collect();
    data.take_rows(&keep)
}

/// Text columns get `"Unknown"` in place of missing cells; numeric columns are
/// linearly interpolated over the row index.
pub fn handle_missing(data: &Dataset, boundary: InterpolationBoundary) -> Result<Dataset> {
    let columns = data
        .columns()
        .iter()
        .map(|column| match column.kind {
            ColumnType::Text => fill_text(column),
            ColumnType::Numeric => Column {
                name: column.name.clone(),
                kind: ColumnType::Numeric,
                cells: interpolate(&column.cells, boundary),
            },
        })
        .collect();

    Dataset::new(columns)
}

/// Keeps the first occurrence of every row and drops later exact repeats.
pub fn remove_duplicates(data: &Dataset) -> Dataset {
    let keep: Vec<usize> = duplicate_mask(data)
        .into_iter()
        .enumerate()
        .filter_map(|(i, dup)| (!dup).then_some(i))
        .collect();
    data.take_rows(&keep)
}

/// `true` at each row that repeats an earlier row across all columns.
/// Missing cells compare equal to each other.
pub fn duplicate_mask(data: &Dataset) -> Vec<bool> {
    let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::with_capacity(data.n_rows());
    (0..data.n_rows())
        .map(|i| !seen.insert(data.row(i).map(CellKey::from).collect()))
        .collect()
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Missing,
    Number(u64),
    Text(&'a str),
}

impl<'a> From<&'a Cell> for CellKey<'a> {
    fn from(cell: &'a Cell) -> Self {
        match cell {
            Cell::Missing => CellKey::Missing,
            // -0.0 與 0.0 視為相同
            Cell::Number(n) if *n == 0.0 => CellKey::Number(0.0f64.to_bits()),
            Cell::Number(n) => CellKey::Number(n.to_bits()),
            Cell::Text(s) => CellKey::Text(s),
        }
    }
}

fn fill_text(column: &Column) -> Column {
    Column {
        name: column.name.clone(),
        kind: ColumnType::Text,
        cells: column
            .cells
            .iter()
            .map(|c| match c {
                Cell::Missing => Cell::Text(TEXT_FILL_VALUE.to_string()),
                other => other.clone(),
            })
            .collect(),
    }
}

/// Leading missing values stay missing. Trailing ones follow `boundary`.
pub fn interpolate(cells: &[Cell], boundary: InterpolationBoundary) -> Vec<Cell> {
    let known: Vec<(usize, f64)> = cells
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.as_number().map(|v| (i, v)))
        .collect();

    let mut out = cells.to_vec();

    for pair in known.windows(2) {
        let (start, from) = pair[0];
        let (end, to) = pair[1];
        let span = (end - start) as f64;
        for (i, cell) in out.iter_mut().enumerate().take(end).skip(start + 1) {
            let t = (i - start) as f64 / span;
            *cell = Cell::Number(from + (to - from) * t);
        }
    }

    if boundary == InterpolationBoundary::CarryForward {
        if let Some(&(last, value)) = known.last() {
            for cell in &mut out[last + 1..] {
                *cell = Cell::Number(value);
            }
        }
    }

    out
}
