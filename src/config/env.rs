//! Environment-variable overlay scoped to a namespace prefix.

use crate::params::ParamValue;

/// Collects environment entries under `prefix` + `separator`.
///
/// Variable names are mapped to config paths by stripping the prefix and
/// separator, splitting the remainder on the separator, and lowercasing the
/// segments. Values are coerced to the most specific shape: boolean,
/// integer, float, or string as a fallback.
pub fn scoped_entries(prefix: &str, separator: &str) -> Vec<(Vec<String>, ParamValue)> {
    let scope = format!("{prefix}{separator}");
    let mut entries = Vec::new();

    for (name, raw) in std::env::vars() {
        let Some(remainder) = name.strip_prefix(&scope) else {
            continue;
        };
        if remainder.is_empty() {
            continue;
        }

        let path: Vec<String> = remainder
            .split(separator)
            .map(|segment| segment.to_lowercase())
            .collect();

        entries.push((path, coerce(&raw)));
    }

    entries
}

fn coerce(raw: &str) -> ParamValue {
    if raw.eq_ignore_ascii_case("true") {
        return ParamValue::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return ParamValue::Bool(false);
    }

    if looks_like_integer(raw) {
        if let Ok(i) = raw.parse::<i64>() {
            return ParamValue::Int(i);
        }
    }

    if raw.contains('.') {
        if let Ok(f) = raw.parse::<f64>() {
            return ParamValue::Float(f);
        }
    }

    ParamValue::Str(raw.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
