//! Logger handles attached to configured parameter maps.
//!
//! A [`Logger`] is a thin, cloneable handle over one of two backends: the
//! [`log`] facade (the default) or an in-memory [`MemorySink`] used for
//! capture and testing. Foreign logger values supplied by the caller are
//! retained as an opaque underlying value rather than driven directly.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::params::{ParamValue, ParameterMap};

/// An ordered in-memory sequence of formatted log lines.
///
/// Cloning shares the underlying storage; two clones of the same sink see
/// each other's entries. Identity (not content) defines equality, via
/// [`same_sink`](Self::same_sink).
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink pre-seeded with existing entries.
    pub fn with_entries(entries: Vec<String>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Creates a sink seeded from caller-supplied values, rendered as plain
    /// lines.
    pub fn from_values(values: &[ParamValue]) -> Self {
        Self::with_entries(
            values
                .iter()
                .map(|value| match value {
                    ParamValue::Str(s) => s.clone(),
                    ParamValue::Int(i) => i.to_string(),
                    ParamValue::Float(f) => f.to_string(),
                    ParamValue::Bool(b) => b.to_string(),
                    other => format!("{other:?}"),
                })
                .collect(),
        )
    }

    pub fn push(&self, line: String) {
        self.lock().push(line);
    }

    /// Snapshot of the recorded lines.
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether two handles share the same underlying storage.
    pub fn same_sink(&self, other: &MemorySink) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Severity levels, mirroring the [`log`] facade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    fn to_facade(self) -> log::Level {
        match self {
            Level::Trace => log::Level::Trace,
            Level::Debug => log::Level::Debug,
            Level::Info => log::Level::Info,
            Level::Warn => log::Level::Warn,
            Level::Error => log::Level::Error,
        }
    }
}

#[derive(Debug)]
enum Backend {
    Facade,
    Memory(MemorySink),
}

#[derive(Debug)]
struct Inner {
    carp_on_warn: bool,
    backend: Mutex<Backend>,
    options: ParameterMap,
    underlying: Option<Box<ParamValue>>,
}

/// A normalized logger handle.
///
/// Cloning is cheap and shares the backend. The handle is what
/// [`configure`](crate::configure) places under the `logger` key of the
/// returned parameter map.
#[derive(Clone, Debug)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl Logger {
    /// A default handle emitting through the [`log`] facade.
    pub fn new(carp_on_warn: bool) -> Self {
        Self::build(carp_on_warn, Backend::Facade, ParameterMap::new(), None)
    }

    /// A handle recording formatted lines into `sink`.
    pub fn with_sink(sink: MemorySink, carp_on_warn: bool) -> Self {
        Self::build(
            carp_on_warn,
            Backend::Memory(sink),
            ParameterMap::new(),
            None,
        )
    }

    /// Builds a handle from a raw logger-options map.
    ///
    /// Two entries select behavior and are extracted: `array` (a sequence or
    /// sink, selecting the in-memory backend) and `logger` (an opaque
    /// underlying logger, retained as-is). A `carp_on_warn` entry overrides
    /// the flag passed in. Everything else, `syslog` included, is carried
    /// unchanged in the handle's [`options`](Self::options) bag.
    pub fn from_options(mut options: ParameterMap, carp_on_warn: bool) -> Self {
        let carp = options
            .remove("carp_on_warn")
            .and_then(|v| v.as_bool())
            .unwrap_or(carp_on_warn);

        let backend = match options.remove("array") {
            Some(ParamValue::Sink(sink)) => Backend::Memory(sink),
            Some(ParamValue::Seq(entries)) => Backend::Memory(MemorySink::from_values(&entries)),
            Some(other) => {
                // Not a usable sink shape; keep it visible in the options bag.
                options.insert("array", other);
                Backend::Facade
            }
            None => Backend::Facade,
        };

        let underlying = options.remove("logger").map(Box::new);

        Self::build(carp, backend, options, underlying)
    }

    /// Wraps an arbitrary foreign value as an opaque underlying logger.
    pub fn wrapping(value: ParamValue, carp_on_warn: bool) -> Self {
        Self::build(
            carp_on_warn,
            Backend::Facade,
            ParameterMap::new(),
            Some(Box::new(value)),
        )
    }

    fn build(
        carp_on_warn: bool,
        backend: Backend,
        options: ParameterMap,
        underlying: Option<Box<ParamValue>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                carp_on_warn,
                backend: Mutex::new(backend),
                options,
                underlying,
            }),
        }
    }

    pub fn log(&self, level: Level, message: &str) {
        match &*self.backend() {
            Backend::Memory(sink) => sink.push(format!("{} {}", level.as_str(), message)),
            Backend::Facade => {
                log::log!(target: "confect", level.to_facade(), "{message}");
            }
        }
    }

    pub fn trace(&self, message: &str) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Logs at warning level; additionally echoes the message to stderr when
    /// the handle was built with `carp_on_warn`.
    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
        if self.inner.carp_on_warn {
            eprintln!("warning: {message}");
        }
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn carp_on_warn(&self) -> bool {
        self.inner.carp_on_warn
    }

    /// The passthrough options the handle was built with (`syslog` and any
    /// other free-form backend settings).
    pub fn options(&self) -> &ParameterMap {
        &self.inner.options
    }

    /// The opaque underlying logger value, if one was wrapped.
    pub fn underlying(&self) -> Option<&ParamValue> {
        self.inner.underlying.as_deref()
    }

    /// The in-memory sink currently backing this handle, if any.
    pub fn sink(&self) -> Option<MemorySink> {
        match &*self.backend() {
            Backend::Memory(sink) => Some(sink.clone()),
            Backend::Facade => None,
        }
    }

    /// Whether this handle already records into exactly `sink`.
    pub fn uses_sink(&self, sink: &MemorySink) -> bool {
        matches!(&*self.backend(), Backend::Memory(s) if s.same_sink(sink))
    }

    /// Switches the backend to record into `sink`. Idempotent when the
    /// handle already uses that sink.
    pub fn attach_sink(&self, sink: MemorySink) {
        *self.backend() = Backend::Memory(sink);
    }

    /// Whether two handles are clones of the same logger.
    pub fn same_handle(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn backend(&self) -> MutexGuard<'_, Backend> {
        self.inner
            .backend
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
