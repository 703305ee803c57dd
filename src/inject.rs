//! The Configurator: merge configuration into constructor parameters and
//! attach a logger handle.

use std::path::PathBuf;

use crate::config::{ConfigError, Source, ENV_SEPARATOR};
use crate::error::Error;
use crate::logger::{Logger, MemorySink};
use crate::params::{ParamValue, ParameterMap};

/// The literal `logger` value that suppresses logger construction.
pub const NULL_LOGGER: &str = "NULL";

/// Derives the config namespace for a class name: every `::` becomes `__`.
///
/// The namespace is the file section key; uppercased, it is the
/// environment-variable prefix. Pure function of the class name.
pub fn namespace(class: &str) -> String {
    class.replace("::", ENV_SEPARATOR)
}

/// The shape of the `logger` parameter before normalization.
enum LoggerSpec {
    Absent,
    Null,
    Sequence(MemorySink),
    Options(ParameterMap),
    Handle(Logger),
    Other(ParamValue),
}

impl From<Option<ParamValue>> for LoggerSpec {
    fn from(value: Option<ParamValue>) -> Self {
        match value {
            None => LoggerSpec::Absent,
            Some(ParamValue::Str(s)) if s == NULL_LOGGER => LoggerSpec::Null,
            Some(ParamValue::Map(options)) => LoggerSpec::Options(options),
            Some(ParamValue::Seq(entries)) => {
                LoggerSpec::Sequence(MemorySink::from_values(&entries))
            }
            Some(ParamValue::Sink(sink)) => LoggerSpec::Sequence(sink),
            Some(ParamValue::Logger(logger)) => LoggerSpec::Handle(logger),
            Some(other) => LoggerSpec::Other(other),
        }
    }
}

/// Merges file- and environment-sourced configuration into `params` and
/// normalizes the `logger` entry into a [`Logger`] handle.
///
/// Reserved parameter keys: `config_file` (path to a TOML file whose section
/// named by the derived namespace is merged in), `config_dirs` (search
/// directories for that file), `schema` (shape validation applied after the
/// merge), `carp_on_warn` (the logger echoes warnings to stderr), and
/// `logger` itself. The returned map always carries a `logger` handle unless
/// the caller opted out with the literal [`NULL_LOGGER`] string.
///
/// Each call is independent: nothing is cached or retained.
///
/// # Panics
///
/// Panics if `class` is empty.
pub fn configure(class: &str, mut params: ParameterMap) -> Result<ParameterMap, Error> {
    assert!(!class.is_empty(), "class name must not be empty");

    // A sequence-shaped logger is pulled out before the merge: the merge
    // replaces sequence values outright, so a config-file entry could
    // silently drop the caller's sink. Re-applied after normalization.
    let mut retained = match params.get("logger") {
        Some(ParamValue::Seq(_) | ParamValue::Sink(_)) => match params.remove("logger") {
            Some(ParamValue::Sink(sink)) => Some(sink),
            Some(ParamValue::Seq(entries)) => Some(MemorySink::from_values(&entries)),
            _ => None,
        },
        _ => None,
    };

    let section = namespace(class);

    let source = match params.get("config_file") {
        Some(value) => {
            let path = value
                .as_str()
                .map(PathBuf::from)
                .ok_or_else(|| invalid_option(class, "config_file", "a string path"))?;
            let dirs = config_dirs(&params).map_err(|e| load_failed(class, e))?;

            if dirs.is_empty() && !crate::config::is_readable(&path) {
                return Err(Error::ConfigUnreadable {
                    class: class.to_string(),
                    path,
                });
            }

            let schema = match params.get("schema") {
                Some(ParamValue::Map(schema)) => Some(schema.clone()),
                Some(_) => return Err(invalid_option(class, "schema", "a map")),
                None => None,
            };

            Source::with_file(&path, &dirs, &section, schema)
                .map_err(|e| load_failed(class, e))?
        }
        None => Source::from_env(&section),
    };

    params = source
        .merge_defaults(params)
        .map_err(|e| load_failed(class, e))?;

    let carp_on_warn = params
        .get("carp_on_warn")
        .and_then(ParamValue::as_bool)
        .unwrap_or(false);

    match LoggerSpec::from(params.remove("logger")) {
        LoggerSpec::Absent => {
            let logger = match retained.take() {
                Some(sink) => Logger::with_sink(sink, carp_on_warn),
                None => Logger::new(carp_on_warn),
            };
            params.insert("logger", logger);
        }
        LoggerSpec::Null => {
            params.insert("logger", NULL_LOGGER);
        }
        LoggerSpec::Sequence(sink) => {
            params.insert("logger", Logger::with_sink(sink, carp_on_warn));
        }
        LoggerSpec::Options(options) => {
            params.insert("logger", Logger::from_options(options, carp_on_warn));
        }
        LoggerSpec::Handle(logger) => {
            params.insert("logger", logger);
        }
        LoggerSpec::Other(value) => {
            params.insert("logger", Logger::wrapping(value, carp_on_warn));
        }
    }

    // Known fragility: when the merge re-introduced a logger value through a
    // different normalization path, the retained sink may not have been
    // consumed. Reattaching is idempotent when the handle already uses it.
    if let Some(sink) = retained {
        if let Some(ParamValue::Logger(logger)) = params.get("logger") {
            if !logger.uses_sink(&sink) {
                logger.attach_sink(sink);
            }
        }
    }

    Ok(params)
}

/// A type constructible from a configured parameter map.
///
/// `CLASS` is the class name handed to [`configure`]; it drives the config
/// namespace and environment prefix. Construction errors are propagated by
/// [`instantiate`] unchanged, which is why `Error` only needs a conversion
/// from the configuration [`Error`](crate::Error).
pub trait Construct: Sized {
    const CLASS: &'static str;

    type Error: From<Error>;

    fn construct(params: ParameterMap) -> Result<Self, Self::Error>;
}

/// Configures `params` for `T` and constructs an instance.
///
/// Equivalent to `T::construct(configure(T::CLASS, params)?)`.
pub fn instantiate<T: Construct>(params: ParameterMap) -> Result<T, T::Error> {
    let params = configure(T::CLASS, params)?;
    T::construct(params)
}

fn config_dirs(params: &ParameterMap) -> Result<Vec<PathBuf>, ConfigError> {
    fn wrong_shape() -> ConfigError {
        ConfigError::InvalidOption {
            key: "config_dirs",
            expected: "a sequence of string paths",
        }
    }

    match params.get("config_dirs") {
        None => Ok(Vec::new()),
        Some(ParamValue::Str(dir)) => Ok(vec![PathBuf::from(dir)]),
        Some(ParamValue::Seq(entries)) => entries
            .iter()
            .map(|entry| entry.as_str().map(PathBuf::from).ok_or_else(wrong_shape))
            .collect(),
        Some(_) => Err(wrong_shape()),
    }
}

fn load_failed(class: &str, source: ConfigError) -> Error {
    Error::ConfigLoadFailed {
        class: class.to_string(),
        source,
    }
}

fn invalid_option(class: &str, key: &'static str, expected: &'static str) -> Error {
    load_failed(class, ConfigError::InvalidOption { key, expected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_namespace_replaces_every_separator() {
        assert_eq!(namespace("my::Dummy"), "my__Dummy");
        assert_eq!(namespace("a::b::c"), "a__b__c");
        assert_eq!(namespace("plain"), "plain");
        // pure and stable
        assert_eq!(namespace("my::Dummy"), namespace("my::Dummy"));
    }

    #[test]
    fn test_empty_params_get_default_logger() {
        let params = configure("injtest::Empty", ParameterMap::new()).unwrap();
        let logger = params.get("logger").unwrap().as_logger().unwrap();
        logger.warn("still works");
        assert!(!logger.carp_on_warn());
    }

    #[test]
    fn test_null_literal_suppresses_logger() {
        let mut params = ParameterMap::new();
        params.insert("logger", NULL_LOGGER);

        let params = configure("injtest::Null", params).unwrap();
        assert_eq!(
            params.get("logger").and_then(|v| v.as_str()),
            Some(NULL_LOGGER)
        );
    }

    #[test]
    fn test_options_map_becomes_handle() {
        let mut options = ParameterMap::new();
        options.insert("syslog", "local0");

        let mut params = ParameterMap::new();
        params.insert("logger", options);

        let params = configure("injtest::Syslog", params).unwrap();
        let logger = params.get("logger").unwrap().as_logger().unwrap();
        assert_eq!(
            logger.options().get("syslog").and_then(|v| v.as_str()),
            Some("local0")
        );
    }

    #[test]
    fn test_existing_handle_left_alone() {
        let original = Logger::new(true);
        let mut params = ParameterMap::new();
        params.insert("logger", original.clone());

        let params = configure("injtest::Handle", params).unwrap();
        let logger = params.get("logger").unwrap().as_logger().unwrap();
        assert!(logger.same_handle(&original));
    }

    #[test]
    fn test_foreign_value_wrapped() {
        let mut params = ParameterMap::new();
        params.insert("logger", "some upstream channel");

        let params = configure("injtest::Wrapped", params).unwrap();
        let logger = params.get("logger").unwrap().as_logger().unwrap();
        assert_eq!(
            logger.underlying().and_then(|v| v.as_str()),
            Some("some upstream channel")
        );
    }

    #[test]
    fn test_sink_param_becomes_logger_backend() {
        let sink = MemorySink::new();
        let mut params = ParameterMap::new();
        params.insert("logger", sink.clone());

        let params = configure("injtest::Capture", params).unwrap();
        let logger = params.get("logger").unwrap().as_logger().unwrap();
        assert!(logger.uses_sink(&sink));

        logger.warn("captured");
        assert_eq!(sink.entries(), vec!["WARN captured"]);
    }

    #[test]
    fn test_sink_survives_config_file_merge() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "[injtest__Merged]\nretries = 3").unwrap();

        let sink = MemorySink::new();
        let mut params = ParameterMap::new();
        params.insert("logger", sink.clone());
        params.insert("config_file", tmp.path().to_str().unwrap());

        let params = configure("injtest::Merged", params).unwrap();
        assert_eq!(params.get("retries"), Some(&ParamValue::Int(3)));

        let logger = params.get("logger").unwrap().as_logger().unwrap();
        assert!(logger.uses_sink(&sink));
    }

    #[test]
    fn test_carp_on_warn_flows_into_logger() {
        let mut params = ParameterMap::new();
        params.insert("carp_on_warn", true);

        let params = configure("injtest::Carp", params).unwrap();
        let logger = params.get("logger").unwrap().as_logger().unwrap();
        assert!(logger.carp_on_warn());
    }

    #[test]
    fn test_unreadable_config_file_without_dirs() {
        let mut params = ParameterMap::new();
        params.insert("config_file", "/nonexistent/path/app.toml");

        let result = configure("injtest::Missing", params);
        assert!(matches!(result, Err(Error::ConfigUnreadable { .. })));
    }

    #[test]
    fn test_missing_file_with_dirs_is_load_failed() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut params = ParameterMap::new();
        params.insert("config_file", "absent.toml");
        params.insert("config_dirs", dir.path().to_str().unwrap());

        let result = configure("injtest::SearchMiss", params);
        assert!(matches!(result, Err(Error::ConfigLoadFailed { .. })));
    }

    #[test]
    fn test_config_file_found_via_search_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("app.toml"),
            "[injtest__Found]\nname = \"from-file\"",
        )
        .unwrap();

        let mut params = ParameterMap::new();
        params.insert("config_file", "app.toml");
        params.insert(
            "config_dirs",
            vec![ParamValue::from(dir.path().to_str().unwrap())],
        );

        let params = configure("injtest::Found", params).unwrap();
        assert_eq!(params.get("name"), Some(&ParamValue::from("from-file")));
    }

    #[test]
    fn test_env_override_scoped_to_namespace() {
        std::env::set_var("INJTEST__ENVY__LIMIT", "9");

        let mut params = ParameterMap::new();
        params.insert("limit", 1);

        let params = configure("injtest::Envy", params).unwrap();
        assert_eq!(params.get("limit"), Some(&ParamValue::Int(9)));
    }

    #[test]
    fn test_idempotent_modulo_handle_identity() {
        let mut input = ParameterMap::new();
        input.insert("name", "twice");
        input.insert("carp_on_warn", true);

        let mut first = configure("injtest::Twice", input.clone()).unwrap();
        let mut second = configure("injtest::Twice", input).unwrap();

        let first_logger = first.remove("logger").unwrap();
        let second_logger = second.remove("logger").unwrap();
        assert_eq!(first, second);
        assert!(first_logger.as_logger().unwrap().carp_on_warn());
        assert!(second_logger.as_logger().unwrap().carp_on_warn());
    }

    #[test]
    #[should_panic(expected = "class name must not be empty")]
    fn test_empty_class_name_panics() {
        let _ = configure("", ParameterMap::new());
    }

    mod dummy {
        use super::*;

        pub struct Dummy {
            pub name: String,
            pub logger: Logger,
        }

        impl Construct for Dummy {
            const CLASS: &'static str = "my::Dummy";
            type Error = Error;

            fn construct(mut params: ParameterMap) -> Result<Self, Error> {
                let logger = match params.remove("logger") {
                    Some(ParamValue::Logger(logger)) => logger,
                    _ => Logger::new(false),
                };
                let name = params
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("dummy")
                    .to_string();
                Ok(Self { name, logger })
            }
        }
    }

    #[test]
    fn test_instantiate_end_to_end() {
        use dummy::Dummy;

        let mut options = ParameterMap::new();
        options.insert("syslog", "local0");

        let mut params = ParameterMap::new();
        params.insert("logger", options);
        params.insert("name", "built");

        let instance: Dummy = instantiate(params).unwrap();
        assert_eq!(instance.name, "built");
        assert_eq!(
            instance.logger.options().get("syslog").and_then(|v| v.as_str()),
            Some("local0")
        );
        instance.logger.warn("instantiated");
    }

    #[test]
    fn test_instantiate_propagates_configure_errors() {
        use dummy::Dummy;

        let mut params = ParameterMap::new();
        params.insert("config_file", "/nonexistent/path/app.toml");

        let result: Result<Dummy, Error> = instantiate(params);
        assert!(matches!(result, Err(Error::ConfigUnreadable { .. })));
    }
}
