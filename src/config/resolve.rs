//! `${path.to.field}` reference resolution in merged configuration.
//!
//! String values may reference other configuration values by dotted path.
//! `$$` escapes a literal `$`. Resolution iterates until a fixed point and
//! fails on cycles, missing paths, and non-scalar targets.

use super::ConfigError;
use crate::params::{ParamValue, ParameterMap};

const MAX_PASSES: usize = 100;

/// Resolves every reference in `map`, in place.
pub fn resolve_references(map: &mut ParameterMap) -> Result<(), ConfigError> {
    for _ in 0..MAX_PASSES {
        let snapshot = map.clone();
        if resolve_map(map, &snapshot)? == 0 {
            return Ok(());
        }
    }
    Err(ConfigError::CircularReference)
}

fn resolve_map(map: &mut ParameterMap, root: &ParameterMap) -> Result<usize, ConfigError> {
    let mut substitutions = 0;
    for (_key, value) in map.iter_mut() {
        substitutions += resolve_value(value, root)?;
    }
    Ok(substitutions)
}

fn resolve_value(value: &mut ParamValue, root: &ParameterMap) -> Result<usize, ConfigError> {
    match value {
        ParamValue::Str(s) => resolve_string(s, root),
        ParamValue::Map(m) => resolve_map(m, root),
        ParamValue::Seq(items) => {
            let mut substitutions = 0;
            for item in items.iter_mut() {
                substitutions += resolve_value(item, root)?;
            }
            Ok(substitutions)
        }
        _ => Ok(0),
    }
}

fn resolve_string(s: &mut String, root: &ParameterMap) -> Result<usize, ConfigError> {
    if !s.contains('$') {
        return Ok(0);
    }

    let mut out = String::with_capacity(s.len());
    let mut substitutions = 0;
    let mut rest = s.as_str();

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(after) = tail.strip_prefix('$') {
            // $$ escapes a literal $
            out.push('$');
            rest = after;
        } else if let Some(after) = tail.strip_prefix('{') {
            let end = after.find('}').ok_or(ConfigError::UnclosedReference)?;
            out.push_str(&lookup(root, &after[..end])?);
            substitutions += 1;
            rest = &after[end + 1..];
        } else {
            out.push('$');
            rest = tail;
        }
    }

    out.push_str(rest);
    *s = out;
    Ok(substitutions)
}

/// Looks up a dotted path and renders the target scalar as a string.
fn lookup(root: &ParameterMap, path: &str) -> Result<String, ConfigError> {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(ConfigError::InvalidReferencePath(path.to_string()));
    }

    let mut current: Option<&ParamValue> = None;
    for segment in path.split('.') {
        current = match current {
            None => root.get(segment),
            Some(value) => value.as_map().and_then(|m| m.get(segment)),
        };
        if current.is_none() {
            return Err(ConfigError::ReferenceNotFound(path.to_string()));
        }
    }

    match current {
        Some(ParamValue::Str(s)) => Ok(s.clone()),
        Some(ParamValue::Int(i)) => Ok(i.to_string()),
        Some(ParamValue::Float(f)) => Ok(f.to_string()),
        Some(ParamValue::Bool(b)) => Ok(b.to_string()),
        _ => Err(ConfigError::NonScalarReference(path.to_string())),
    }
}
