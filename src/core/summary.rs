use crate::core::transforms::duplicate_mask;
use crate::domain::model::{ColumnSummary, Dataset, SummaryReport};
use std::collections::BTreeMap;
use std::fmt::{self, Write};

pub fn summarize(data: &Dataset) -> SummaryReport {
    let column_summaries: Vec<ColumnSummary> = data
        .columns()
        .iter()
        .map(|c| ColumnSummary {
            name: c.name.clone(),
            kind: c.kind,
            dtype: c.dtype().to_string(),
            non_null: c.non_null_count(),
            missing: c.missing_count(),
        })
        .collect();

    let total_missing = column_summaries.iter().map(|c| c.missing).sum();
    let duplicate_rows = duplicate_mask(data).into_iter().filter(|d| *d).count();

    let schema = schema_dump(data.n_rows(), &column_summaries);

    SummaryReport {
        rows: data.n_rows(),
        columns: data.n_cols(),
        column_summaries,
        total_missing,
        duplicate_rows,
        schema,
    }
}

/// Column table in the layout of a dataframe `info()` dump.
fn schema_dump(rows: usize, columns: &[ColumnSummary]) -> String {
    let mut out = String::new();

    if rows == 0 {
        let _ = writeln!(out, "RangeIndex: 0 entries");
    } else {
        let _ = writeln!(out, "RangeIndex: {} entries, 0 to {}", rows, rows - 1);
    }
    let _ = writeln!(out, "Data columns (total {} columns):", columns.len());

    let name_width = columns
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Column".len());
    let count_width = "Non-Null Count".len();

    let _ = writeln!(
        out,
        " {:<3} {:<name_width$}  {:<count_width$}  Dtype",
        "#", "Column", "Non-Null Count"
    );
    let _ = writeln!(
        out,
        "---  {:<name_width$}  {:<count_width$}  -----",
        "-".repeat("Column".len()),
        "-".repeat(count_width)
    );

    for (idx, c) in columns.iter().enumerate() {
        let _ = writeln!(
            out,
            " {:<3} {:<name_width$}  {:<count_width$}  {}",
            idx,
            c.name,
            format!("{} non-null", c.non_null),
            c.dtype
        );
    }

    let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
    for c in columns {
        *tally.entry(c.dtype.as_str()).or_default() += 1;
    }
    let dtypes: Vec<String> = tally
        .iter()
        .map(|(dtype, count)| format!("{}({})", dtype, count))
        .collect();
    let _ = write!(out, "dtypes: {}", dtypes.join(", "));

    out
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Basic Summary")?;
        writeln!(f, "Rows: {}", self.rows)?;
        writeln!(f, "Columns: {}", self.columns)?;
        writeln!(f)?;
        writeln!(f, "{}", self.schema)?;
        writeln!(f)?;
        writeln!(f, "Number of missing values per column:")?;
        for c in &self.column_summaries {
            writeln!(f, "  {}: {}", c.name, c.missing)?;
        }
        writeln!(f, "Total missing values: {}", self.total_missing)?;
        write!(f, "Number of duplicate records: {}", self.duplicate_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader;

    #[test]
    fn test_summary_of_people_csv() {
        let ds = loader::load(b"name,age\nAlice,30\nBob,\nAlice,30\n", "people.csv").unwrap();
        let report = summarize(&ds);

        assert_eq!(report.rows, 3);
        assert_eq!(report.columns, 2);
        assert_eq!(report.column_summaries[1].name, "age");
        assert_eq!(report.column_summaries[1].missing, 1);
        assert_eq!(report.column_summaries[1].dtype, "float64");
        assert_eq!(report.column_summaries[0].dtype, "object");
        assert_eq!(report.total_missing, 1);
        assert_eq!(report.duplicate_rows, 1);
    }

    #[test]
    fn test_schema_dump_lists_columns() {
        let ds = loader::load(b"id,city\n1,Oslo\n2,\n", "cities.csv").unwrap();
        let report = summarize(&ds);

        assert!(report.schema.contains("RangeIndex: 2 entries, 0 to 1"));
        assert!(report.schema.contains("Data columns (total 2 columns):"));
        assert!(report.schema.contains("2 non-null"));
        assert!(report.schema.contains("1 non-null"));
        assert!(report.schema.ends_with("dtypes: int64(1), object(1)"));
    }

    #[test]
    fn test_display_includes_counts() {
        let ds = loader::load(b"a\n1\n1\n", "dups.csv").unwrap();
        let text = summarize(&ds).to_string();
        assert!(text.contains("Rows: 2"));
        assert!(text.contains("Number of duplicate records: 1"));
        assert!(text.contains("  a: 0"));
    }

    #[test]
    fn test_empty_dataset_summary() {
        let report = summarize(&Dataset::default());
        assert_eq!(report.rows, 0);
        assert_eq!(report.duplicate_rows, 0);
        assert!(report.schema.contains("RangeIndex: 0 entries"));
    }
}
