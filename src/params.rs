//! The heterogeneous parameter map passed through configuration injection.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::config::ConfigError;
use crate::logger::{Logger, MemorySink};

/// Constructor parameters for a to-be-built object.
///
/// A string-keyed map of [`ParamValue`]s. Created by the caller per
/// construction attempt, passed by value into
/// [`configure`](crate::configure), mutated (merged config keys and the
/// normalized `logger` entry are added or overwritten) and handed back.
/// Nothing is retained across calls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterMap {
    entries: BTreeMap<String, ParamValue>,
}

/// A single parameter value.
///
/// Covers the plain data shapes a config file or environment variable can
/// produce, plus the two handle shapes that only exist at runtime: an
/// in-memory log sink and a constructed [`Logger`].
#[derive(Clone, Debug)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Map(ParameterMap),
    Seq(Vec<ParamValue>),
    Sink(MemorySink),
    Logger(Logger),
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key, returning the previous value if one was present.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ParamValue> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, String, ParamValue> {
        self.entries.iter_mut()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, ParamValue> {
        self.entries.keys()
    }

    /// Converts the data portion of the map to a TOML table.
    ///
    /// Handle-valued entries ([`ParamValue::Sink`], [`ParamValue::Logger`])
    /// have no TOML representation and are skipped.
    pub fn into_toml(&self) -> toml::Table {
        let mut table = toml::Table::new();
        for (key, value) in &self.entries {
            if let Some(v) = value.to_toml() {
                table.insert(key.clone(), v);
            }
        }
        table
    }

    /// Deserializes the data portion of the map into a typed structure.
    ///
    /// This is the typed view for [`Construct`](crate::Construct)
    /// implementations that prefer a plain config struct over key lookups.
    /// Handle-valued entries are skipped, so the target type should not
    /// declare a `logger` field.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        toml::Value::Table(self.into_toml())
            .try_into()
            .map_err(ConfigError::DeserializeError)
    }
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Boolean view with the coercions config sources produce: native
    /// booleans, nonzero integers, and `"true"`/`"false"`/`"1"`/`"0"`
    /// strings (case-insensitive).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Int(i) => Some(*i != 0),
            ParamValue::Str(s) => {
                if s.eq_ignore_ascii_case("true") || s == "1" {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") || s == "0" {
                    Some(false)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ParameterMap> {
        match self {
            ParamValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_logger(&self) -> Option<&Logger> {
        match self {
            ParamValue::Logger(l) => Some(l),
            _ => None,
        }
    }

    /// Shape name used in schema-violation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Str(_) => "string",
            ParamValue::Int(_) => "integer",
            ParamValue::Float(_) => "float",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Map(_) => "map",
            ParamValue::Seq(_) => "seq",
            ParamValue::Sink(_) => "sink",
            ParamValue::Logger(_) => "logger",
        }
    }

    fn to_toml(&self) -> Option<toml::Value> {
        match self {
            ParamValue::Str(s) => Some(toml::Value::String(s.clone())),
            ParamValue::Int(i) => Some(toml::Value::Integer(*i)),
            ParamValue::Float(f) => Some(toml::Value::Float(*f)),
            ParamValue::Bool(b) => Some(toml::Value::Boolean(*b)),
            ParamValue::Map(m) => Some(toml::Value::Table(m.into_toml())),
            ParamValue::Seq(s) => Some(toml::Value::Array(
                s.iter().filter_map(ParamValue::to_toml).collect(),
            )),
            ParamValue::Sink(_) | ParamValue::Logger(_) => None,
        }
    }
}

// Data variants compare structurally; handle variants compare by identity,
// matching the "equivalent modulo handle identity" contract of configure().
impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::Str(a), ParamValue::Str(b)) => a == b,
            (ParamValue::Int(a), ParamValue::Int(b)) => a == b,
            (ParamValue::Float(a), ParamValue::Float(b)) => a == b,
            (ParamValue::Bool(a), ParamValue::Bool(b)) => a == b,
            (ParamValue::Map(a), ParamValue::Map(b)) => a == b,
            (ParamValue::Seq(a), ParamValue::Seq(b)) => a == b,
            (ParamValue::Sink(a), ParamValue::Sink(b)) => a.same_sink(b),
            (ParamValue::Logger(a), ParamValue::Logger(b)) => a.same_handle(b),
            _ => false,
        }
    }
}

impl FromIterator<(String, ParamValue)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, ParamValue)> for ParameterMap {
    fn extend<I: IntoIterator<Item = (String, ParamValue)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for ParameterMap {
    type Item = (String, ParamValue);
    type IntoIter = btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParameterMap {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<toml::Table> for ParameterMap {
    fn from(table: toml::Table) -> Self {
        table
            .into_iter()
            .map(|(k, v)| (k, ParamValue::from(v)))
            .collect()
    }
}

impl From<toml::Value> for ParamValue {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => ParamValue::Str(s),
            toml::Value::Integer(i) => ParamValue::Int(i),
            toml::Value::Float(f) => ParamValue::Float(f),
            toml::Value::Boolean(b) => ParamValue::Bool(b),
            toml::Value::Datetime(dt) => ParamValue::Str(dt.to_string()),
            toml::Value::Array(arr) => {
                ParamValue::Seq(arr.into_iter().map(ParamValue::from).collect())
            }
            toml::Value::Table(table) => ParamValue::Map(table.into()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Float(f)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<ParameterMap> for ParamValue {
    fn from(m: ParameterMap) -> Self {
        ParamValue::Map(m)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(s: Vec<ParamValue>) -> Self {
        ParamValue::Seq(s)
    }
}

impl From<MemorySink> for ParamValue {
    fn from(sink: MemorySink) -> Self {
        ParamValue::Sink(sink)
    }
}

impl From<Logger> for ParamValue {
    fn from(logger: Logger) -> Self {
        ParamValue::Logger(logger)
    }
}
