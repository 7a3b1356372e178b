//! Structure report of a (wide) result table.

use polars::prelude::*;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
}

/// Row count plus name, type and non-null count of every column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl TableSummary {
    pub fn from_frame(df: &DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| ColumnSummary {
                name: col.name().to_string(),
                dtype: col.dtype().to_string(),
                non_null: col.len() - col.null_count(),
            })
            .collect();
        Self {
            rows: df.height(),
            columns,
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} rows, {} columns", self.rows, self.width())?;
        let name_width = self
            .columns
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max("Column".len());
        writeln!(f, " {:>4}  {:<name_width$}  {:>9}  Dtype", "#", "Column", "Non-Null")?;
        for (i, col) in self.columns.iter().enumerate() {
            writeln!(
                f,
                " {:>4}  {:<name_width$}  {:>9}  {}",
                i, col.name, col.non_null, col.dtype
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_nulls_per_column() {
        let df = DataFrame::new(vec![
            Column::new("a".into(), vec![Some(1.0), None, Some(3.0)]),
            Column::new("label".into(), vec!["x", "y", "z"]),
        ])
        .unwrap();
        let summary = TableSummary::from_frame(&df);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.width(), 2);
        assert_eq!(summary.column("a").unwrap().non_null, 2);
        assert_eq!(summary.column("label").unwrap().non_null, 3);
        assert_eq!(summary.column("a").unwrap().dtype, "f64");
    }

    #[test]
    fn display_lists_every_column() {
        let df = DataFrame::new(vec![
            Column::new("close".into(), vec![1.0, 2.0]),
            Column::new("ADX_14".into(), vec![None::<f64>, Some(30.0)]),
        ])
        .unwrap();
        let text = TableSummary::from_frame(&df).to_string();
        assert!(text.starts_with("2 rows, 2 columns\n"));
        assert!(text.contains("close"));
        assert!(text.contains("ADX_14"));
    }
}
