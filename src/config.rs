//! Process-wide settings.
//!
//! Settings are resolved once at startup with [`init`] (the CLI loads them
//! from a YAML file) and read afterwards through [`global`]. Library callers
//! that never call [`init`] get [`Settings::detect`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::InferConvError;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Runtime settings shared by conversion and plotting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub plot: PlotSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    /// First label of generated coordinates on non-sample dimensions.
    #[serde(default)]
    pub index_origin: i64,

    /// Whether tree-like nested records are recognized as an input shape.
    #[serde(default = "nested_supported")]
    pub nested_structures: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlotSettings {
    /// Plotting backend used when a call does not name one.
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            index_origin: 0,
            nested_structures: nested_supported(),
        }
    }
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::detect()
    }
}

impl Settings {
    /// Default settings with capabilities resolved from the build.
    pub fn detect() -> Self {
        Self {
            data: DataSettings::default(),
            plot: PlotSettings::default(),
        }
    }

    /// Loads settings from a YAML file. Missing keys take their defaults.
    ///
    /// Nested-structure support cannot be switched on in a build without the
    /// `nested` feature.
    pub fn from_yaml_file(path: &Path) -> Result<Self, InferConvError> {
        let text = fs::read_to_string(path).map_err(|source| InferConvError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings =
            serde_yaml::from_str(&text).map_err(|source| InferConvError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.data.nested_structures &= nested_supported();
        Ok(settings)
    }
}

/// Installs the process-wide settings.
///
/// Returns `false` (leaving the earlier value in place) if settings were
/// already initialized or read.
pub fn init(settings: Settings) -> bool {
    SETTINGS.set(settings).is_ok()
}

/// The process-wide settings, detected on first use if [`init`] was never
/// called.
pub fn global() -> &'static Settings {
    SETTINGS.get_or_init(Settings::detect)
}

fn nested_supported() -> bool {
    cfg!(feature = "nested")
}

fn default_backend() -> String {
    "matplotlib".to_string()
}
