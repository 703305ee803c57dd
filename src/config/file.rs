//! File location and loading for the configuration source.

use std::fs;
use std::path::{Path, PathBuf};

use super::ConfigError;
use crate::params::ParameterMap;

/// Whether the file at `path` exists and can be opened for reading.
pub(crate) fn is_readable(path: &Path) -> bool {
    fs::File::open(path).is_ok()
}

/// Resolves a config file against a list of search directories.
///
/// The path itself wins when readable; otherwise each directory is joined
/// with the path and tried in order.
pub fn resolve(path: &Path, dirs: &[PathBuf]) -> Result<PathBuf, ConfigError> {
    if is_readable(path) {
        return Ok(path.to_path_buf());
    }

    for dir in dirs {
        let candidate = dir.join(path);
        if is_readable(&candidate) {
            return Ok(candidate);
        }
    }

    Err(ConfigError::FileNotFound(path.to_path_buf()))
}

/// Loads and parses a TOML config file into a parameter map.
pub fn load(path: &Path) -> Result<ParameterMap, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let table: toml::Table = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(table.into())
}
