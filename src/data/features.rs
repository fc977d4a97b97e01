//! Column-major feature matrix handed to the model

use crate::{Error, Result};

/// Dense feature matrix stored column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl Features {
    /// Build from named columns of equal length.
    ///
    /// # Errors
    ///
    /// Returns error if names and columns disagree or column lengths differ.
    pub fn from_columns(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(Error::InvalidInput(format!(
                "{} column names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        let n_rows = columns.first().map_or(0, Vec::len);
        if let Some((idx, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != n_rows) {
            return Err(Error::InvalidInput(format!(
                "column '{}' has {} rows, expected {n_rows}",
                names[idx],
                col.len()
            )));
        }
        Ok(Self {
            names,
            columns,
            n_rows,
        })
    }

    /// Feature names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of samples.
    #[must_use]
    pub const fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of features.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// All values of feature `j`.
    #[must_use]
    pub fn column(&self, j: usize) -> &[f64] {
        &self.columns[j]
    }

    /// Iterate over feature columns.
    pub fn columns(&self) -> impl Iterator<Item = &[f64]> {
        self.columns.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_columns_rejects_ragged() {
        let names = vec!["a".to_string(), "b".to_string()];
        let result = Features::from_columns(names, vec![vec![1.0], vec![1.0, 2.0]]);
        assert!(result.is_err());
    }
}
