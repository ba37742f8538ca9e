//! JSON serialization for containers and value documents.
//!
//! The container form is the on-disk representation read back by the path
//! branch of the dispatcher. Value documents describe an arbitrary input
//! [`Value`] (including sampler objects) so that it can be handed to the CLI.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::container::InferenceData;
use super::value::Value;
use crate::error::InferConvError;

/// Reads a container from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read, is not a serialized
/// container, or breaks the coordinate invariant.
pub fn read_container_json(path: &Path) -> Result<InferenceData, InferConvError> {
    let file = File::open(path).map_err(InferConvError::Io)?;
    let reader = BufReader::new(file);
    tracing::debug!(path = %path.display(), "reading container json");

    let idata: InferenceData =
        serde_json::from_reader(reader).map_err(|source| InferConvError::ContainerJsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    idata.check_consistency()?;
    Ok(idata)
}

/// Writes a container to a JSON file.
pub fn write_container_json(path: &Path, idata: &InferenceData) -> Result<(), InferConvError> {
    let file = File::create(path).map_err(InferConvError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, idata).map_err(|source| {
        InferConvError::ContainerJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(InferConvError::Io)
}

/// Reads a container from JSON bytes.
///
/// Useful for fuzzing and processing raw bytes without UTF-8 validation.
pub fn from_json_slice(bytes: &[u8]) -> Result<InferenceData, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Reads a container from a JSON string.
pub fn from_json_str(json: &str) -> Result<InferenceData, serde_json::Error> {
    serde_json::from_str(json)
}

/// Writes a container to a JSON string.
pub fn to_json_string(idata: &InferenceData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(idata)
}

/// Reads a value document from a JSON file.
pub fn read_value_json(path: &Path) -> Result<Value, InferConvError> {
    let file = File::open(path).map_err(InferConvError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| InferConvError::ValueJsonParse {
        path: path.to_path_buf(),
        source,
    })
}
