use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error type for configuration injection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A config file path was given without fallback search directories and
    /// the file is not readable.
    #[error("config file for {class} is not readable: {path}")]
    ConfigUnreadable { class: String, path: PathBuf },

    /// The configuration source could not be constructed or its merge
    /// operation failed.
    #[error("failed to load configuration for {class}: {source}")]
    ConfigLoadFailed {
        class: String,
        #[source]
        source: ConfigError,
    },
}
