//! Schema defaulting and type coercion (spec §4.7 stage 4): fills in
//! required `Recipe` fields that a loosely-structured source omitted, and
//! coerces values serialized as strings (common when scraped from HTML
//! tables) back into their schema types.

use serde_yaml::value::Value;

fn mapping(value: &mut Value) -> Option<&mut serde_yaml::Mapping> {
    match value {
        Value::Mapping(m) => Some(m),
        _ => None,
    }
}

fn ensure_string(map: &mut serde_yaml::Mapping, key: &str, default: &str) {
    let k = Value::String(key.to_string());
    match map.get(&k) {
        Some(Value::String(_)) => {}
        Some(Value::Null) | None => {
            map.insert(k, Value::String(default.to_string()));
        }
        Some(other) => {
            let coerced = match other {
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => default.to_string(),
            };
            map.insert(k, Value::String(coerced));
        }
    }
}

fn ensure_sequence(map: &mut serde_yaml::Mapping, key: &str) {
    let k = Value::String(key.to_string());
    match map.get(&k) {
        Some(Value::Sequence(_)) => {}
        _ => {
            map.insert(k, Value::Sequence(Vec::new()));
        }
    }
}

/// Coerce a concentration `value` field that arrived as a numeric-looking
/// string (e.g. `"5.0"` scraped from an HTML table cell) into a float.
fn coerce_numeric_strings(value: &mut Value) {
    match value {
        Value::Mapping(map) => {
            let keys: Vec<Value> = map.keys().cloned().collect();
            for key in keys {
                if let Value::String(k) = &key {
                    if k == "value" {
                        if let Some(Value::String(s)) = map.get(&key) {
                            if let Ok(n) = s.trim().parse::<f64>() {
                                map.insert(key.clone(), Value::Number(n.into()));
                                continue;
                            }
                        }
                    }
                }
                if let Some(inner) = map.get_mut(&key) {
                    coerce_numeric_strings(inner);
                }
            }
        }
        Value::Sequence(items) => {
            for item in items {
                coerce_numeric_strings(item);
            }
        }
        _ => {}
    }
}

/// Fill in required top-level `Recipe` fields with schema defaults so the
/// document satisfies `serde`'s required-field expectations even when the
/// source omitted them entirely (spec §4.7 stage 4).
pub fn apply_defaults(value: &mut Value) {
    coerce_numeric_strings(value);
    let Some(map) = mapping(value) else {
        return;
    };

    ensure_string(map, "id", "UNKNOWN_0_unknown");
    ensure_string(map, "name", "Unknown medium");
    ensure_string(map, "original_name", "Unknown medium");
    ensure_sequence(map, "categories");
    ensure_sequence(map, "ingredients");
    ensure_sequence(map, "solutions");
    ensure_sequence(map, "target_organisms");
    ensure_sequence(map, "preparation_steps");
    ensure_sequence(map, "evidence");
    ensure_sequence(map, "curation_history");
    ensure_sequence(map, "synonyms");
    ensure_sequence(map, "merged_from");

    let medium_type_key = Value::String("medium_type".to_string());
    if !matches!(map.get(&medium_type_key), Some(Value::String(_))) {
        map.insert(medium_type_key, Value::String("UNKNOWN".to_string()));
    }
    let physical_state_key = Value::String("physical_state".to_string());
    if !matches!(map.get(&physical_state_key), Some(Value::String(_))) {
        map.insert(physical_state_key, Value::String("UNKNOWN".to_string()));
    }

    let provenance_key = Value::String("provenance".to_string());
    let needs_provenance = !matches!(map.get(&provenance_key), Some(Value::Mapping(_)));
    if needs_provenance {
        let mut provenance = serde_yaml::Mapping::new();
        provenance.insert(
            Value::String("source_db".to_string()),
            Value::String("UNKNOWN".to_string()),
        );
        provenance.insert(
            Value::String("source_id".to_string()),
            Value::String("UNKNOWN".to_string()),
        );
        map.insert(provenance_key, Value::Mapping(provenance));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_missing_required_fields() {
        let mut value: Value = serde_yaml::from_str("id: X_1_y\nname: y\n").unwrap();
        apply_defaults(&mut value);
        let recipe: culturemech_core::Recipe = serde_yaml::from_value(value).unwrap();
        assert_eq!(recipe.provenance.source_db, "UNKNOWN");
        assert!(recipe.ingredients.is_empty());
    }

    #[test]
    fn coerces_stringified_concentration_value() {
        let mut value: Value = serde_yaml::from_str(
            "id: X_1_y\nname: y\ningredients:\n  - preferred_term: NaCl\n    concentration:\n      value: \"5.0\"\n      unit: G_PER_L\n",
        )
        .unwrap();
        apply_defaults(&mut value);
        let recipe: culturemech_core::Recipe = serde_yaml::from_value(value).unwrap();
        assert_eq!(recipe.ingredients[0].concentration.unwrap().value, Some(5.0));
    }
}
