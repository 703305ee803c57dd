//! Deep-merge primitives for parameter maps.

use crate::params::{ParamValue, ParameterMap};

/// Merges `overlay` into `base`.
///
/// Nested maps merge recursively, key-by-key, with the overlay winning at
/// conflicts. Every other shape, sequences included, replaces the base value
/// outright.
pub fn deep_merge(base: &mut ParameterMap, overlay: ParameterMap) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(ParamValue::Map(base_map)), ParamValue::Map(overlay_map)) => {
                deep_merge(base_map, overlay_map);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Merges a single value at a nested path, creating intermediate maps as
/// needed. Non-map values along the path are displaced.
pub fn merge_at_path(map: &mut ParameterMap, path: &[String], value: ParamValue) {
    let Some((first, rest)) = path.split_first() else {
        if let ParamValue::Map(overlay) = value {
            deep_merge(map, overlay);
        }
        return;
    };

    if rest.is_empty() {
        match (map.get_mut(first), value) {
            (Some(ParamValue::Map(base_map)), ParamValue::Map(overlay_map)) => {
                deep_merge(base_map, overlay_map);
            }
            (_, value) => {
                map.insert(first.clone(), value);
            }
        }
        return;
    }

    if !matches!(map.get(first), Some(ParamValue::Map(_))) {
        map.insert(first.clone(), ParameterMap::new());
    }

    if let Some(ParamValue::Map(nested)) = map.get_mut(first) {
        merge_at_path(nested, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(pairs: &[(&str, ParamValue)]) -> ParameterMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_deep_merge_nested_maps() {
        let mut base = map_of(&[(
            "db",
            ParamValue::Map(map_of(&[
                ("host", ParamValue::from("localhost")),
                ("port", ParamValue::Int(5432)),
            ])),
        )]);
        let overlay = map_of(&[(
            "db",
            ParamValue::Map(map_of(&[("host", ParamValue::from("remote"))])),
        )]);

        deep_merge(&mut base, overlay);

        let db = base.get("db").unwrap().as_map().unwrap();
        assert_eq!(db.get("host"), Some(&ParamValue::from("remote")));
        assert_eq!(db.get("port"), Some(&ParamValue::Int(5432)));
    }

    #[test]
    fn test_sequences_replaced_not_merged() {
        let mut base = map_of(&[(
            "tags",
            ParamValue::Seq(vec![ParamValue::from("a"), ParamValue::from("b")]),
        )]);
        let overlay = map_of(&[("tags", ParamValue::Seq(vec![ParamValue::from("c")]))]);

        deep_merge(&mut base, overlay);

        assert_eq!(
            base.get("tags"),
            Some(&ParamValue::Seq(vec![ParamValue::from("c")]))
        );
    }

    #[test]
    fn test_merge_at_path_creates_intermediates() {
        let mut map = ParameterMap::new();
        let path = vec!["db".to_string(), "host".to_string()];
        merge_at_path(&mut map, &path, ParamValue::from("localhost"));

        let db = map.get("db").unwrap().as_map().unwrap();
        assert_eq!(db.get("host"), Some(&ParamValue::from("localhost")));
    }

    #[test]
    fn test_merge_at_path_displaces_scalar() {
        let mut map = map_of(&[("db", ParamValue::Int(1))]);
        let path = vec!["db".to_string(), "host".to_string()];
        merge_at_path(&mut map, &path, ParamValue::from("x"));

        assert!(map.get("db").unwrap().as_map().is_some());
    }
}
