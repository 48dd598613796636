//! Viewer configuration.
//!
//! All tunable limits live in [`ViewerConfig`]. It is read once per session
//! and turned into immutable values (such as [`DecodeOptions`]) that are
//! handed to each stage.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{DecodeOptions, DEFAULT_DOWNSAMPLE_CAP};
use crate::pager::{PreRenderWindow, DEFAULT_PRE_RENDER_RADIUS};
use crate::recognize::{ReferenceCode, DEFAULT_REFERENCE_CODE};

/// Error types for loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings for one viewing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Maximum width or height of a decoded page.
    pub downsample_cap: u32,
    /// Pages kept materialized on each side of the current page.
    pub pre_render_radius: usize,
    /// Code value treated as a match.
    pub reference_code: String,
    /// Largest container file accepted, in bytes.
    pub max_file_size: u64,
    /// Allocation ceiling for a single decode, in bytes.
    pub max_decoded_bytes: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            downsample_cap: DEFAULT_DOWNSAMPLE_CAP,
            pre_render_radius: DEFAULT_PRE_RENDER_RADIUS,
            reference_code: DEFAULT_REFERENCE_CODE.to_string(),
            max_file_size: 64 * 1024 * 1024,
            max_decoded_bytes: 256 * 1024 * 1024,
        }
    }
}

impl ViewerConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Reject settings that would make every session fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.downsample_cap == 0 {
            return Err(ConfigError::Invalid(
                "downsample_cap must be non-zero".to_string(),
            ));
        }
        if self.max_file_size == 0 {
            return Err(ConfigError::Invalid(
                "max_file_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Decode options derived from this config.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            cap: self.downsample_cap,
            max_alloc: Some(self.max_decoded_bytes),
        }
    }

    /// Pre-render window derived from this config.
    pub fn pre_render_window(&self) -> PreRenderWindow {
        PreRenderWindow::new(self.pre_render_radius)
    }

    /// Match policy derived from this config.
    pub fn reference_code(&self) -> ReferenceCode {
        ReferenceCode::new(self.reference_code.clone())
    }
}
