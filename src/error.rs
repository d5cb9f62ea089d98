//! Error types for the photo cycler.

use thiserror::Error;

/// Errors that can occur while configuring or driving the photo cycler.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable directories at startup
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A property write was rejected; the stored value is unchanged
    #[error("invalid value for property '{property}': {reason}")]
    InvalidPropertyValue {
        /// Property name
        property: String,
        /// Why the value was rejected
        reason: String,
    },

    /// No property with this name exists on the device
    #[error("unknown property: {0}")]
    UnknownProperty(String),

    /// The property exists but cannot be written
    #[error("property '{0}' is read-only")]
    ReadOnlyProperty(String),

    /// Filesystem failure during a refresh tick
    #[error("refresh tick failed: {0}")]
    Tick(String),
}

impl Error {
    pub(crate) fn invalid_value(property: &str, reason: impl Into<String>) -> Self {
        Error::InvalidPropertyValue {
            property: property.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Configuration(format!("invalid YAML: {}", err))
    }
}
