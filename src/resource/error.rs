use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Anything that can go wrong between asking for a key and getting a parsed
/// series back.
///
/// The three cases have different blast radii: fetch and parse failures are
/// scoped to one coordinate, while a cache failure breaks the at-most-one-
/// fetch guarantee for every key and is treated as fatal by the orchestrator.
#[derive(Debug, Error)]
pub enum ResourceDataError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Network or provider failure while downloading a series.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("provider returned status {status} for {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body for {0}")]
    Body(String, #[source] reqwest::Error),

    #[error("provider rejected request for {key}: {message}")]
    Provider { key: String, message: String },
}

/// Malformed downloaded series. Indicates a permanent format mismatch, so it
/// is never retried.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("resource payload for {key} is not valid UTF-8")]
    NotUtf8 { key: String },

    #[error("resource payload for {key} is truncated ({lines} lines)")]
    TruncatedPayload { key: String, lines: usize },

    #[error("site metadata for {key} has {names} names but {values} values")]
    MetadataMismatch {
        key: String,
        names: usize,
        values: usize,
    },

    #[error("site metadata field '{field}' for {key} is not a number")]
    BadMetadataNumber { key: String, field: String },

    #[error("I/O error while parsing series for {key}")]
    CsvReadIo {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse series CSV for {key}")]
    CsvReadPolars {
        key: String,
        #[source]
        source: PolarsError,
    },

    #[error("series for {key} has no '{field}' column")]
    MissingField { key: String, field: String },

    #[error("series column '{field}' for {key} is not numeric")]
    ColumnType {
        key: String,
        field: String,
        #[source]
        source: PolarsError,
    },

    #[error("series for {key} has no samples in '{field}'")]
    EmptySeries { key: String, field: String },

    #[error("background parse task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Backing-store read/write failure. Durable cache semantics are
/// load-bearing, so these abort the run.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("failed to read cache artifact '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to create temporary file in '{0}'")]
    TempFile(PathBuf, #[source] std::io::Error),

    #[error("failed to write cache artifact '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("failed to persist cache artifact '{0}'")]
    Persist(PathBuf, #[source] std::io::Error),

    #[error("background cache task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
