//! Runtime configuration injection.
//!
//! Given a class name and a map of constructor parameters, [`configure`]
//! merges settings sourced from a TOML file and/or environment variables
//! (scoped to a namespace derived from the class name) into the parameters
//! and normalizes the `logger` entry into a [`Logger`] handle. The caller
//! then constructs its object from the returned map, or lets
//! [`instantiate`] do both steps through the [`Construct`] trait.
//!
//! ```no_run
//! use confect::{configure, ParameterMap};
//!
//! let mut params = ParameterMap::new();
//! params.insert("config_file", "app.toml");
//! params.insert("config_dirs", "/etc/myapp");
//!
//! let params = configure("my::Service", params)?;
//! let logger = params.get("logger").unwrap().as_logger().unwrap();
//! logger.warn("configured");
//! # Ok::<(), confect::Error>(())
//! ```

pub mod config;
pub mod logger;
pub mod params;

mod error;
mod inject;

pub use config::{ConfigError, Source};
pub use error::Error;
pub use inject::{configure, instantiate, namespace, Construct, NULL_LOGGER};
pub use logger::{Level, Logger, MemorySink};
pub use params::{ParamValue, ParameterMap};
