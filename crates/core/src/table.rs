//! Row-oriented tabular input boundary
//!
//! [`Table`] is the minimal tabular source [`GridData`](crate::GridData)
//! is built from: a set of named columns of equal length, each either
//! numeric or text. Loading a `Table` from CSV or elsewhere is left to
//! the caller.

use crate::error::{Error, Result};

/// A single named column of tabular data.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Floating point values
    Numeric(Vec<f64>),
    /// Text values (e.g. borehole identifiers)
    Text(Vec<String>),
}

impl Column {
    /// Number of rows in the column
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    /// Whether the column has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A row-oriented table with nameable columns.
///
/// All columns must have the same number of rows. Column names are
/// unique; pushing a second column under an existing name is rejected.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<(String, Column)>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column, consuming and returning the table (builder style).
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.push_column(name, column)?;
        Ok(self)
    }

    /// Add a numeric column (builder style).
    pub fn with_numeric(self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.with_column(name, Column::Numeric(values))
    }

    /// Add a text column (builder style).
    pub fn with_text(self, name: impl Into<String>, values: Vec<String>) -> Result<Self> {
        self.with_column(name, Column::Text(values))
    }

    /// Add a column in place.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.columns.iter().any(|(n, _)| *n == name) {
            return Err(Error::InvalidParameter {
                name: "column",
                value: name,
                reason: "column name already present".into(),
            });
        }
        if let Some((first_name, first)) = self.columns.first()
            && first.len() != column.len()
        {
            return Err(Error::InvalidParameter {
                name: "column",
                value: name,
                reason: format!(
                    "length {} does not match column {} of length {}",
                    column.len(),
                    first_name,
                    first.len()
                ),
            });
        }
        self.columns.push((name, column));
        Ok(())
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Number of rows (0 for an empty table)
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    /// Number of columns
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Fetch a column as floating point values.
    ///
    /// Numeric columns are returned as-is; text columns are parsed row by
    /// row (the equivalent of a float cast on a string column).
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        match self.column(name) {
            None => Err(Error::MissingColumn(name.into())),
            Some(Column::Numeric(v)) => Ok(v.clone()),
            Some(Column::Text(v)) => v
                .iter()
                .map(|s| {
                    s.trim().parse::<f64>().map_err(|_| Error::InvalidParameter {
                        name: "column",
                        value: name.into(),
                        reason: format!("value {s:?} is not numeric"),
                    })
                })
                .collect(),
        }
    }

    /// Fetch a column as text values.
    ///
    /// Numeric columns are formatted row by row, so a numeric identifier
    /// column is accepted.
    pub fn text_column(&self, name: &str) -> Result<Vec<String>> {
        match self.column(name) {
            None => Err(Error::MissingColumn(name.into())),
            Some(Column::Text(v)) => Ok(v.clone()),
            Some(Column::Numeric(v)) => Ok(v.iter().map(|x| x.to_string()).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_lookup() {
        let table = Table::new()
            .with_text("hole", vec!["a".into(), "b".into()])
            .unwrap()
            .with_numeric("depth", vec![1.0, 2.0])
            .unwrap();

        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_columns(), 2);
        assert!(table.column("hole").is_some());
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = Table::new()
            .with_numeric("a", vec![1.0, 2.0])
            .unwrap()
            .with_numeric("b", vec![1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = Table::new()
            .with_numeric("a", vec![1.0])
            .unwrap()
            .with_numeric("a", vec![2.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_numeric_cast_from_text() {
        let table = Table::new()
            .with_text("v", vec!["1.5".into(), " 2 ".into()])
            .unwrap();
        let values = table.numeric_column("v").unwrap();
        assert_eq!(values, vec![1.5, 2.0]);

        let table = Table::new().with_text("v", vec!["abc".into()]).unwrap();
        assert!(table.numeric_column("v").is_err());
    }

    #[test]
    fn test_text_from_numeric_id() {
        let table = Table::new().with_numeric("id", vec![1.0, 2.0]).unwrap();
        assert_eq!(table.text_column("id").unwrap(), vec!["1", "2"]);
    }

    #[test]
    fn test_missing_column() {
        let table = Table::new();
        assert!(matches!(
            table.numeric_column("X"),
            Err(Error::MissingColumn(_))
        ));
    }
}
