use std::path::PathBuf;

use thiserror::Error;

/// Errors raised at the edges of the crate: configuration and host adapters.
///
/// The placement core itself never fails; see the individual components for
/// how they degrade.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::PerchConfig`].
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A configuration value is out of its accepted range.
    #[error("invalid config value {field}: {reason}")]
    ConfigValue {
        field: &'static str,
        reason: &'static str,
    },

    /// Foreign-window enumeration failed on the host.
    #[error("window enumeration failed: {0}")]
    Enumeration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
