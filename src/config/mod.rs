//! The configuration-source collaborator.
//!
//! A [`Source`] is bound to an optional TOML file (with search directories),
//! a namespace used as both the file section key and the environment-variable
//! prefix, and an optional validation schema. Its single operation,
//! [`merge_defaults`](Source::merge_defaults), overlays file- and
//! environment-sourced settings on top of caller-supplied defaults.

mod env;
mod error;
mod file;
mod merge;
mod resolve;
mod schema;

pub use error::ConfigError;

pub(crate) use file::is_readable;

use std::path::{Path, PathBuf};

use crate::params::{ParamValue, ParameterMap};

/// Separator between namespace segments and option names in environment
/// variables, and the token namespace derivation substitutes for `::`.
pub const ENV_SEPARATOR: &str = "__";

/// A configuration source scoped to one class namespace.
#[derive(Debug)]
pub struct Source {
    file: Option<PathBuf>,
    section: String,
    env_prefix: String,
    schema: Option<ParameterMap>,
}

impl Source {
    /// An environment-only source: no file, settings read from variables
    /// under the uppercased namespace prefix.
    pub fn from_env(namespace: &str) -> Self {
        Self {
            file: None,
            section: namespace.to_string(),
            env_prefix: namespace.to_uppercase(),
            schema: None,
        }
    }

    /// A source backed by a config file, resolved against `dirs`.
    ///
    /// The path is used directly when readable; otherwise each directory is
    /// tried in order. Fails with [`ConfigError::FileNotFound`] when no
    /// candidate exists.
    pub fn with_file(
        path: impl AsRef<Path>,
        dirs: &[PathBuf],
        namespace: &str,
        schema: Option<ParameterMap>,
    ) -> Result<Self, ConfigError> {
        let resolved = file::resolve(path.as_ref(), dirs)?;
        Ok(Self {
            file: Some(resolved),
            section: namespace.to_string(),
            env_prefix: namespace.to_uppercase(),
            schema,
        })
    }

    /// Overlays this source's settings on top of `defaults` and returns the
    /// merged map.
    ///
    /// Order: the file section named by the namespace first, then
    /// environment entries (so the environment wins over the file). Nested
    /// maps merge key-by-key; scalars and sequences are replaced outright.
    /// `${path.to.field}` references are resolved after merging, and the
    /// schema, if bound, is validated last.
    pub fn merge_defaults(&self, defaults: ParameterMap) -> Result<ParameterMap, ConfigError> {
        let mut merged = defaults;

        if let Some(path) = &self.file {
            let mut table = file::load(path)?;
            if let Some(ParamValue::Map(overlay)) = table.remove(&self.section) {
                merge::deep_merge(&mut merged, overlay);
            }
        }

        for (path, value) in env::scoped_entries(&self.env_prefix, ENV_SEPARATOR) {
            merge::merge_at_path(&mut merged, &path, value);
        }

        resolve::resolve_references(&mut merged)?;

        if let Some(schema) = &self.schema {
            schema::validate(&merged, schema)?;
        }

        Ok(merged)
    }
}
