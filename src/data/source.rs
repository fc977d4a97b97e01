//! Dataset sources - HTTP(S) download or local file

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use reqwest::Url;

use super::dataset::DEFAULT_DELIMITER;
use super::Dataset;
use crate::logging::NamedChannel;
use crate::{Error, Result};

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// `http://` or `https://` URL
    Http(String),
    /// Local path (bare or from a `file://` URL)
    File(PathBuf),
}

impl DatasetSource {
    /// Classify a URL or path.
    ///
    /// # Errors
    ///
    /// Returns `DatasetLoad` for a `file://` URL that is not a valid path.
    pub fn parse(uri: &str) -> Result<Self> {
        match Url::parse(uri) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Http(uri.to_string())),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Self::File)
                .map_err(|()| Error::DatasetLoad {
                    source_uri: uri.to_string(),
                    reason: "file URL does not name a local path".to_string(),
                }),
            // bare paths, including Windows drive letters parsed as schemes
            _ => Ok(Self::File(PathBuf::from(uri))),
        }
    }

    fn is_parquet(&self) -> bool {
        let name = match self {
            Self::Http(url) => url.split(['?', '#']).next().unwrap_or(url),
            Self::File(path) => path.to_str().unwrap_or_default(),
        };
        name.ends_with(".parquet")
    }

    /// Fetch and parse the dataset.
    ///
    /// # Errors
    ///
    /// Returns `DatasetLoad` for transport failures and `DatasetFormat` /
    /// `Parquet` errors for unreadable content.
    pub fn read(&self) -> Result<Dataset> {
        match self {
            Self::Http(url) => {
                let response = reqwest::blocking::get(url)
                    .and_then(reqwest::blocking::Response::error_for_status)
                    .map_err(|e| load_error(url, &e))?;
                if self.is_parquet() {
                    let bytes = response.bytes().map_err(|e| load_error(url, &e))?;
                    read_parquet(ParquetRecordBatchReaderBuilder::try_new(bytes)?)
                } else {
                    let text = response.text().map_err(|e| load_error(url, &e))?;
                    Dataset::from_delimited(&text, DEFAULT_DELIMITER)
                }
            }
            Self::File(path) => {
                if self.is_parquet() {
                    let file = File::open(path).map_err(|e| load_error(&display(path), &e))?;
                    read_parquet(ParquetRecordBatchReaderBuilder::try_new(file)?)
                } else {
                    let text =
                        fs::read_to_string(path).map_err(|e| load_error(&display(path), &e))?;
                    Dataset::from_delimited(&text, DEFAULT_DELIMITER)
                }
            }
        }
    }
}

fn read_parquet<T>(builder: ParquetRecordBatchReaderBuilder<T>) -> Result<Dataset>
where
    T: parquet::file::reader::ChunkReader + 'static,
{
    let batches = builder
        .build()?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Dataset::from_batches(&batches)
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn load_error(source_uri: &str, err: &dyn std::fmt::Display) -> Error {
    Error::DatasetLoad {
        source_uri: source_uri.to_string(),
        reason: err.to_string(),
    }
}

/// Load the dataset at `uri`, logging the outcome.
///
/// A failure is logged at ERROR with its full description and then returned.
///
/// # Errors
///
/// Any error from [`DatasetSource::parse`] or [`DatasetSource::read`].
pub fn load_dataset(uri: &str, log: &NamedChannel) -> Result<Dataset> {
    log.info(&format!("Loading dataset from: {uri}"));
    match DatasetSource::parse(uri).and_then(|source| source.read()) {
        Ok(dataset) => {
            let (rows, cols) = dataset.shape();
            log.info(&format!("Dataset loaded with shape: ({rows}, {cols})"));
            Ok(dataset)
        }
        Err(e) => {
            log.error(&format!("Failed to load dataset: {e}"));
            Err(e)
        }
    }
}
