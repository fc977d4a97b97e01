//! Dataset - numeric table held as an Arrow record batch

use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, UInt32Array};
use arrow::compute::{cast, concat_batches, take};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use super::Features;
use crate::{Error, Result};

/// Label column of the wine-quality dataset.
pub const LABEL_COLUMN: &str = "quality";

/// Field separator of the wine-quality CSV.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Numeric dataset with named `Float64` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    /// Parse delimited text with a header row through the Arrow CSV reader.
    ///
    /// Fields follow CSV quoting, so a quoted header may contain the
    /// delimiter. A leading byte-order mark is ignored. Every column is read
    /// as `Float64`.
    ///
    /// # Errors
    ///
    /// Returns `DatasetFormat` for a missing header or no data rows, and
    /// `Arrow` for ragged rows or non-numeric cells.
    pub fn from_delimited(text: &str, delimiter: u8) -> Result<Self> {
        let bytes = text.strip_prefix('\u{feff}').unwrap_or(text).as_bytes();

        let (header, _) = Format::default()
            .with_header(true)
            .with_delimiter(delimiter)
            .infer_schema(Cursor::new(bytes), Some(0))?;
        if header.fields().iter().all(|f| f.name().trim().is_empty()) {
            return Err(Error::DatasetFormat {
                line: 1,
                reason: "missing header row".to_string(),
            });
        }

        let schema = Schema::new(
            header
                .fields()
                .iter()
                .map(|f| Field::new(f.name().as_str(), DataType::Float64, true))
                .collect::<Vec<_>>(),
        );
        let batches = ReaderBuilder::new(Arc::new(schema))
            .with_header(true)
            .with_delimiter(delimiter)
            .build(Cursor::new(bytes))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Self::from_batches(&batches)
    }

    /// Build from named numeric columns.
    ///
    /// # Errors
    ///
    /// Returns error if column lengths differ.
    pub fn from_columns(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        let schema = Arc::new(Schema::new(
            names
                .iter()
                .map(|name| Field::new(name.as_str(), DataType::Float64, false))
                .collect::<Vec<_>>(),
        ));
        let arrays: Vec<ArrayRef> = columns
            .into_iter()
            .map(|values| Arc::new(Float64Array::from(values)) as ArrayRef)
            .collect();
        Ok(Self {
            batch: RecordBatch::try_new(schema, arrays)?,
        })
    }

    /// Wrap record batches, casting every column to `Float64`.
    ///
    /// # Errors
    ///
    /// Returns error if a column cannot be cast, contains nulls, or the
    /// batches have no rows.
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self> {
        let first = batches.first().ok_or_else(|| Error::DatasetFormat {
            line: 0,
            reason: "no record batches".to_string(),
        })?;
        let combined = concat_batches(&first.schema(), batches)?;

        let mut names = Vec::with_capacity(combined.num_columns());
        let mut columns = Vec::with_capacity(combined.num_columns());
        for (field, array) in combined.schema().fields().iter().zip(combined.columns()) {
            if array.null_count() > 0 {
                return Err(Error::DatasetFormat {
                    line: 0,
                    reason: format!("column '{}' contains nulls", field.name()),
                });
            }
            let cast_array = cast(array, &DataType::Float64)?;
            names.push(field.name().clone());
            columns.push(float_values(&cast_array, field.name())?);
        }

        if combined.num_rows() == 0 {
            return Err(Error::DatasetFormat {
                line: 0,
                reason: "no data rows".to_string(),
            });
        }
        Self::from_columns(names, columns)
    }

    /// Underlying record batch.
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.num_columns())
    }

    /// Column names in schema order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Values of column `name`.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if no such column exists.
    pub fn column_values(&self, name: &str) -> Result<Vec<f64>> {
        let array = self
            .batch
            .column_by_name(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))?;
        float_values(array, name)
    }

    /// Rows at `indices`, in that order.
    ///
    /// # Errors
    ///
    /// Returns error if an index is out of bounds.
    pub fn take_rows(&self, indices: &[u32]) -> Result<Self> {
        let indices = UInt32Array::from(indices.to_vec());
        let columns = self
            .batch
            .columns()
            .iter()
            .map(|column| take(column.as_ref(), &indices, None))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            batch: RecordBatch::try_new(self.batch.schema(), columns)?,
        })
    }

    /// Separate `label` from the remaining feature columns.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if `label` is absent.
    pub fn split_label(&self, label: &str) -> Result<(Features, Vec<f64>)> {
        let labels = self.column_values(label)?;
        let mut names = Vec::new();
        let mut columns = Vec::new();
        for name in self.column_names() {
            if name == label {
                continue;
            }
            columns.push(self.column_values(&name)?);
            names.push(name);
        }
        Ok((Features::from_columns(names, columns)?, labels))
    }
}

fn float_values(array: &ArrayRef, name: &str) -> Result<Vec<f64>> {
    array
        .as_any()
        .downcast_ref::<Float64Array>()
        .map(|a| a.values().to_vec())
        .ok_or_else(|| Error::DatasetFormat {
            line: 0,
            reason: format!("column '{name}' is not Float64"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\"fixed acidity\";\"alcohol\";\"quality\"\n7.4;9.4;5\n7.8;9.8;5\n11.2;9.8;6\n";

    #[test]
    fn test_parse_quoted_header() {
        let dataset = Dataset::from_delimited(SAMPLE, b';').unwrap();
        assert_eq!(dataset.shape(), (3, 3));
        assert_eq!(
            dataset.column_names(),
            vec!["fixed acidity", "alcohol", "quality"]
        );
        assert_eq!(dataset.column_values("quality").unwrap(), vec![5.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_rejects_non_numeric_cell() {
        let err = Dataset::from_delimited("a;b\n1;2\n3;abc\n", b';').unwrap_err();
        assert!(matches!(err, Error::Arrow(_)));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_parse_quoted_field_containing_delimiter() {
        let dataset = Dataset::from_delimited("\"acid;ity\";\"quality\"\n7.4;5\n7.8;6\n", b';').unwrap();
        assert_eq!(dataset.shape(), (2, 2));
        assert_eq!(dataset.column_names(), vec!["acid;ity", "quality"]);
        assert_eq!(dataset.column_values("acid;ity").unwrap(), vec![7.4, 7.8]);
    }

    #[test]
    fn test_parse_strips_byte_order_mark() {
        let dataset =
            Dataset::from_delimited("\u{feff}\"fixed acidity\";\"quality\"\n7.4;5\n", b';').unwrap();
        assert_eq!(dataset.column_names(), vec!["fixed acidity", "quality"]);
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(Dataset::from_delimited("", b';').is_err());
    }

    #[test]
    fn test_parse_rejects_ragged_row() {
        assert!(Dataset::from_delimited("a;b\n1;2;3\n", b';').is_err());
    }

    #[test]
    fn test_parse_rejects_header_only() {
        assert!(Dataset::from_delimited("a;b\n", b';').is_err());
    }

    #[test]
    fn test_split_label_missing_column() {
        let dataset = Dataset::from_delimited("a;b\n1;2\n", b';').unwrap();
        assert!(matches!(
            dataset.split_label(LABEL_COLUMN),
            Err(Error::MissingColumn(_))
        ));
    }

    #[test]
    fn test_split_label() {
        let dataset = Dataset::from_delimited(SAMPLE, b';').unwrap();
        let (features, labels) = dataset.split_label(LABEL_COLUMN).unwrap();
        assert_eq!(features.names(), &["fixed acidity", "alcohol"]);
        assert_eq!(features.n_rows(), 3);
        assert_eq!(labels, vec![5.0, 5.0, 6.0]);
    }

    #[test]
    fn test_take_rows() {
        let dataset = Dataset::from_delimited(SAMPLE, b';').unwrap();
        let subset = dataset.take_rows(&[2, 0]).unwrap();
        assert_eq!(subset.column_values("fixed acidity").unwrap(), vec![11.2, 7.4]);
    }

    #[test]
    fn test_from_batches_casts_integers() {
        use arrow::array::Int32Array;
        let schema = Arc::new(Schema::new(vec![
            Field::new("alcohol", DataType::Float64, false),
            Field::new("quality", DataType::Int32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![9.4, 9.8])),
                Arc::new(Int32Array::from(vec![5, 6])),
            ],
        )
        .unwrap();
        let dataset = Dataset::from_batches(&[batch]).unwrap();
        assert_eq!(dataset.column_values("quality").unwrap(), vec![5.0, 6.0]);
    }
}
