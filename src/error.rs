use std::path::PathBuf;
use thiserror::Error;

/// The main error type for inferconv operations.
#[derive(Debug, Error)]
pub enum InferConvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse container JSON from {path}: {source}")]
    ContainerJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write container JSON to {path}: {source}")]
    ContainerJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse value document from {path}: {source}")]
    ValueJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse Stan CSV from {path}: {source}")]
    StanCsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid Stan CSV {path}: {message}")]
    StanCsvInvalid { path: PathBuf, message: String },

    #[error("Cannot use coords or dims arguments with {input}.")]
    CoordsWithStructuredInput { input: &'static str },

    #[error("Can only convert {supported} to InferenceData, not {received}")]
    UnsupportedInput { supported: String, received: String },

    #[error(
        "Can not extract {group} from the converted data! See {alternatives} for other conversion utilities."
    )]
    MissingGroup { group: String, alternatives: String },

    #[error("Unknown group '{0}'")]
    UnknownGroup(String),

    #[error("{extractor}() got an unexpected keyword argument '{keyword}'")]
    UnexpectedKeyword {
        extractor: &'static str,
        keyword: String,
    },

    #[error("{extractor}() keyword '{keyword}' must be {expected}")]
    InvalidKeyword {
        extractor: &'static str,
        keyword: String,
        expected: &'static str,
    },

    #[error("{extractor}() requires the '{keyword}' keyword")]
    MissingKeyword {
        extractor: &'static str,
        keyword: &'static str,
    },

    #[error("Invalid sampler output for {extractor}(): {message}")]
    InvalidSamplerOutput {
        extractor: &'static str,
        message: String,
    },

    #[error("Coordinate '{dim}' has {found} label(s) but the axis has length {expected}")]
    CoordLength {
        dim: String,
        expected: usize,
        found: usize,
    },

    #[error("Variable '{variable}' has {ndim} axis/axes but {dims} dimension name(s)")]
    DimsMismatch {
        variable: String,
        ndim: usize,
        dims: usize,
    },

    #[error("Variable '{name}' cannot be converted to an array (got {received})")]
    InvalidVariable { name: String, received: String },

    #[error("Invalid separation plot input: {0}")]
    SeparationInput(String),

    #[error("Failed to read settings from {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
