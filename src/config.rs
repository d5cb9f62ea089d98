//! Runtime configuration.
//!
//! Configuration can be built in code, loaded from YAML, or assembled from
//! command line arguments by the binary. Every field except the two
//! directories has a default.
//!
//! # Example (YAML)
//!
//! ```yaml
//! photos_path: /srv/photos
//! static_path: /srv/photo-cycler/static
//! port: 8888
//! update_rate: 30
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, DEFAULT_PORT, DEFAULT_UPDATE_RATE};

/// Photo cycler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding the candidate photos
    #[serde(default)]
    pub photos_path: PathBuf,

    /// Directory served under `/static/`; receives the `current.jpg` link
    #[serde(default)]
    pub static_path: PathBuf,

    /// Address the HTTP server binds to (default: "0.0.0.0")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP port (default: 8888)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Initial refresh interval in seconds (default: 5)
    #[serde(default = "default_update_rate")]
    pub update_rate: f64,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_update_rate() -> f64 {
    DEFAULT_UPDATE_RATE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            photos_path: PathBuf::new(),
            static_path: PathBuf::new(),
            bind_address: default_bind_address(),
            port: default_port(),
            update_rate: default_update_rate(),
        }
    }
}

impl Config {
    /// Create a config for the given directories with default settings.
    pub fn new(photos_path: impl Into<PathBuf>, static_path: impl Into<PathBuf>) -> Self {
        Self {
            photos_path: photos_path.into(),
            static_path: static_path.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Configuration(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Set the HTTP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the bind address.
    #[must_use]
    pub fn with_bind_address(mut self, address: impl Into<String>) -> Self {
        self.bind_address = address.into();
        self
    }

    /// Set the initial refresh interval in seconds.
    #[must_use]
    pub fn with_update_rate(mut self, seconds: f64) -> Self {
        self.update_rate = seconds;
        self
    }

    /// Check both directories and return a copy with canonical paths.
    ///
    /// The photos directory is checked first so that a bad photos path is
    /// reported before the static directory is looked at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if:
    /// - either path is unset, missing, or not a directory
    /// - the photos directory cannot be listed
    /// - a file cannot be created in the static directory
    /// - the initial update rate is negative
    pub fn validate(&self) -> Result<Self, Error> {
        let photos_path = existing_dir(&self.photos_path, "Photos")?;
        fs::read_dir(&photos_path).map_err(|e| {
            Error::Configuration(format!(
                "Photos directory '{}' is not readable: {}",
                photos_path.display(),
                e
            ))
        })?;

        let static_path = existing_dir(&self.static_path, "Static")?;
        // The link is created by this process, so check with a real file
        tempfile::Builder::new()
            .prefix(".photo-cycler-")
            .tempfile_in(&static_path)
            .map_err(|e| {
                Error::Configuration(format!(
                    "Static directory '{}' is not writable: {}",
                    static_path.display(),
                    e
                ))
            })?;

        if !self.update_rate.is_finite() || self.update_rate < 0.0 {
            return Err(Error::Configuration(format!(
                "update_rate must be a non-negative number, got {}",
                self.update_rate
            )));
        }

        Ok(Self {
            photos_path,
            static_path,
            ..self.clone()
        })
    }
}

fn existing_dir(path: &Path, label: &str) -> Result<PathBuf, Error> {
    if path.as_os_str().is_empty() {
        return Err(Error::Configuration(format!(
            "{} directory not set",
            label
        )));
    }

    let canonical = path.canonicalize().map_err(|e| {
        let problem = if e.kind() == io::ErrorKind::NotFound {
            "does not exist"
        } else {
            "is not accessible"
        };
        Error::Configuration(format!(
            "{} directory {}: {}: {}",
            label,
            problem,
            path.display(),
            e
        ))
    })?;

    if !canonical.is_dir() {
        return Err(Error::Configuration(format!(
            "{} path is not a directory: {}",
            label,
            canonical.display()
        )));
    }

    Ok(canonical)
}
