//! Shape validation for merged configuration.
//!
//! A schema is itself a parameter map: keys name config entries, values are
//! either a type-name string (`"string"`, `"integer"`, `"float"`,
//! `"boolean"`, `"map"`, `"seq"`, `"any"`) or a nested schema map for nested
//! sections. Only keys present in the merged config are checked.

use super::ConfigError;
use crate::params::{ParamValue, ParameterMap};

pub fn validate(params: &ParameterMap, schema: &ParameterMap) -> Result<(), ConfigError> {
    for (key, expected) in schema {
        let Some(value) = params.get(key) else {
            continue;
        };

        match expected {
            ParamValue::Map(nested) => match value {
                ParamValue::Map(inner) => validate(inner, nested)?,
                other => {
                    return Err(ConfigError::SchemaViolation {
                        key: key.clone(),
                        expected: "map".to_string(),
                        found: other.type_name(),
                    })
                }
            },
            ParamValue::Str(type_name) => check_type(key, type_name, value)?,
            _ => return Err(ConfigError::InvalidSchema(key.clone())),
        }
    }
    Ok(())
}

fn check_type(key: &str, expected: &str, value: &ParamValue) -> Result<(), ConfigError> {
    let matches = match expected {
        "any" => true,
        "string" | "integer" | "float" | "boolean" | "map" | "seq" => {
            value.type_name() == expected
        }
        _ => return Err(ConfigError::InvalidSchema(key.to_string())),
    };

    if matches {
        Ok(())
    } else {
        Err(ConfigError::SchemaViolation {
            key: key.to_string(),
            expected: expected.to_string(),
            found: value.type_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_map(toml_str: &str) -> ParameterMap {
        toml_str.parse::<toml::Table>().unwrap().into()
    }

    #[test]
    fn test_matching_types_pass() {
        let params = make_map(
            r#"
            name = "demo"
            port = 8080
            [db]
            host = "localhost"
            "#,
        );
        let schema = make_map(
            r#"
            name = "string"
            port = "integer"
            [db]
            host = "string"
            "#,
        );
        validate(&params, &schema).unwrap();
    }

    #[test]
    fn test_absent_keys_are_not_checked() {
        let params = make_map(r#"name = "demo""#);
        let schema = make_map(
            r#"
            name = "string"
            port = "integer"
            "#,
        );
        validate(&params, &schema).unwrap();
    }

    #[test]
    fn test_wrong_type_rejected() {
        let params = make_map(r#"port = "eighty""#);
        let schema = make_map(r#"port = "integer""#);
        assert!(matches!(
            validate(&params, &schema),
            Err(ConfigError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn test_nested_violation() {
        let params = make_map(
            r#"
            [db]
            port = "not-a-number"
            "#,
        );
        let schema = make_map(
            r#"
            [db]
            port = "integer"
            "#,
        );
        assert!(matches!(
            validate(&params, &schema),
            Err(ConfigError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn test_unknown_type_name_rejected() {
        let params = make_map(r#"port = 1"#);
        let schema = make_map(r#"port = "quantity""#);
        assert!(matches!(
            validate(&params, &schema),
            Err(ConfigError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_any_accepts_everything() {
        let params = make_map(r#"extra = [1, 2]"#);
        let schema = make_map(r#"extra = "any""#);
        validate(&params, &schema).unwrap();
    }
}
