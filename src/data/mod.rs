//! Tabular dataset loading and splitting
//!
//! The wine-quality dataset is a semicolon-delimited CSV with a header row and
//! a numeric `quality` label. It is held as an Arrow [`RecordBatch`] and turned
//! into a column-major [`Features`] matrix plus label vector for fitting.
//!
//! [`RecordBatch`]: arrow::record_batch::RecordBatch

mod dataset;
mod features;
mod source;
mod split;

pub use dataset::{Dataset, DEFAULT_DELIMITER, LABEL_COLUMN};
pub use features::Features;
pub use source::{load_dataset, DatasetSource};
pub use split::{split_indices, train_test_split, DEFAULT_TEST_FRACTION};

/// Train/test features and labels ready for fitting.
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Training features
    pub train_features: Features,
    /// Training labels
    pub train_labels: Vec<f64>,
    /// Test features
    pub test_features: Features,
    /// Test labels
    pub test_labels: Vec<f64>,
}

impl PreparedData {
    /// Split `dataset` and separate the `label` column on both sides.
    ///
    /// # Errors
    ///
    /// Returns error if the split is degenerate or `label` is missing.
    pub fn from_dataset(
        dataset: &Dataset,
        label: &str,
        test_fraction: f64,
        seed: Option<u64>,
    ) -> crate::Result<Self> {
        let (train, test) = train_test_split(dataset, test_fraction, seed)?;
        let (train_features, train_labels) = train.split_label(label)?;
        let (test_features, test_labels) = test.split_label(label)?;
        Ok(Self {
            train_features,
            train_labels,
            test_features,
            test_labels,
        })
    }
}
