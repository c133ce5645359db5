//! Load specifications: the user-supplied request for data items.
//!
//! A load spec is a JSON object with exactly four recognized sections:
//!
//! - `features`: namespace -> { `node` / `edge` -> list of feature names }
//! - `xmlids`: { `node` / `edge` -> bool }
//! - `primary`: bool
//! - `prepare`: ordered mapping of auxiliary preparation steps, opaque to
//!   this crate beyond shape-checking (the order defines execution order
//!   for the external preparer, so it is preserved verbatim)
//!
//! Validation is strict and complete: every violation found is collected
//! and reported in one aggregated error, not just the first. Feature names
//! that contain a key-separator character are violations too; rejecting
//! them here keeps serialized keys unambiguous.
//!
//! This module does no I/O. Callers read the document and pass the parsed
//! JSON value in (the crate's `serde_json` carries `preserve_order`, so
//! object order survives parsing).

use itertools::Itertools;
use serde_json::{Map, Value};

use crate::errors::{AnnographError, AnnographResult};

/// The recognized top-level sections.
pub const SECTIONS: [&str; 4] = ["features", "xmlids", "primary", "prepare"];

/// The recognized second-level keys under `features.<ns>` and `xmlids`.
pub const SUBKEYS: [&str; 2] = ["node", "edge"];

/// XML-identifier map request, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XmlIdRequest {
    pub node: bool,
    pub edge: bool,
}

/// Requested feature names for one namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceFeatures {
    pub namespace: String,
    pub node: Vec<String>,
    pub edge: Vec<String>,
}

/// A validated, typed load specification.
///
/// Section order is preserved where it is semantic: namespaces and feature
/// names keep document order, and `prepare` is carried as an ordered
/// mapping for the external preparer.
#[derive(Debug, Clone, Default)]
pub struct LoadSpec {
    pub features: Vec<NamespaceFeatures>,
    pub xmlids: XmlIdRequest,
    pub primary: bool,
    pub prepare: Map<String, Value>,
}

impl LoadSpec {
    /// Validate a JSON document and extract the typed spec.
    pub fn from_value(value: &Value) -> AnnographResult<Self> {
        validate_value(value)?;

        let obj = value.as_object().expect("validated spec is an object");
        let mut spec = LoadSpec::default();

        if let Some(features) = obj.get("features").and_then(Value::as_object) {
            for (namespace, per_kind) in features {
                let per_kind = per_kind.as_object().expect("validated namespace value");
                let names = |sub: &str| -> Vec<String> {
                    per_kind
                        .get(sub)
                        .and_then(Value::as_array)
                        .map(|xs| {
                            xs.iter()
                                .filter_map(Value::as_str)
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default()
                };
                spec.features.push(NamespaceFeatures {
                    namespace: namespace.clone(),
                    node: names("node"),
                    edge: names("edge"),
                });
            }
        }

        if let Some(xmlids) = obj.get("xmlids").and_then(Value::as_object) {
            spec.xmlids.node = xmlids.get("node").and_then(Value::as_bool).unwrap_or(false);
            spec.xmlids.edge = xmlids.get("edge").and_then(Value::as_bool).unwrap_or(false);
        }

        spec.primary = obj.get("primary").and_then(Value::as_bool).unwrap_or(false);

        if let Some(prepare) = obj.get("prepare").and_then(Value::as_object) {
            spec.prepare = prepare.clone();
        }

        Ok(spec)
    }

    /// Parse a JSON string and extract the typed spec.
    pub fn from_json_str(text: &str) -> AnnographResult<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            AnnographError::spec_shape([format!("load spec is not valid JSON: {e}")])
        })?;
        Self::from_value(&value)
    }
}

/// Check a load-spec document against the recognized sections and shapes.
///
/// Returns silently if valid; otherwise every detected problem is gathered
/// into one [`AnnographError::SpecShape`].
pub fn validate_value(value: &Value) -> AnnographResult<()> {
    let Some(obj) = value.as_object() else {
        return Err(AnnographError::spec_shape([format!(
            "the load spec must be an object, not {}",
            json_type(value)
        )]));
    };

    let mut errors: Vec<String> = Vec::new();
    for (section, val) in obj {
        match section.as_str() {
            "xmlids" => check_xmlids(val, &mut errors),
            "primary" => {
                if !val.is_boolean() {
                    errors.push(format!(
                        "under primary only these values are allowed: false, true; not {}",
                        json_type(val)
                    ));
                }
            }
            "features" => check_features(val, &mut errors),
            "prepare" => {
                if !val.is_object() {
                    errors.push(format!(
                        "the value of prepare should be an ordered mapping, not {}",
                        json_type(val)
                    ));
                }
            }
            other => errors.push(format!(
                "only these sections are allowed: {}; not {other}",
                SECTIONS.iter().join(", ")
            )),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AnnographError::spec_shape(errors))
    }
}

fn check_xmlids(val: &Value, errors: &mut Vec<String>) {
    let Some(obj) = val.as_object() else {
        errors.push(format!(
            "the value of xmlids should be an object, not {}",
            json_type(val)
        ));
        return;
    };
    for (subkey, subval) in obj {
        if !SUBKEYS.contains(&subkey.as_str()) {
            errors.push(format!(
                "under xmlids only these keys are allowed: {}; not {subkey}",
                SUBKEYS.iter().join(", ")
            ));
        } else if !subval.is_boolean() {
            errors.push(format!(
                "under xmlids and then {subkey} only these values are allowed: false, true; not {}",
                json_type(subval)
            ));
        }
    }
}

fn check_features(val: &Value, errors: &mut Vec<String>) {
    let Some(namespaces) = val.as_object() else {
        errors.push(format!(
            "the value of features should be an object, not {}",
            json_type(val)
        ));
        return;
    };
    for (namespace, per_kind) in namespaces {
        let Some(per_kind) = per_kind.as_object() else {
            errors.push(format!(
                "under features and then {namespace} the value should be an object, not {}",
                json_type(per_kind)
            ));
            continue;
        };
        for (subkey, names) in per_kind {
            if !SUBKEYS.contains(&subkey.as_str()) {
                errors.push(format!(
                    "under features and then {namespace} only these keys are allowed: {}; not {subkey}",
                    SUBKEYS.iter().join(", ")
                ));
                continue;
            }
            let Some(names) = names.as_array() else {
                errors.push(format!(
                    "under features and then {namespace} and then {subkey} the value should be a list, not {}",
                    json_type(names)
                ));
                continue;
            };
            for name in names {
                check_feature_name(namespace, subkey, name, errors);
            }
        }
    }
}

fn check_feature_name(namespace: &str, subkey: &str, name: &Value, errors: &mut Vec<String>) {
    let Some(name) = name.as_str() else {
        errors.push(format!(
            "under features and then {namespace} and then {subkey} every name should be a string, not {}",
            json_type(name)
        ));
        return;
    };
    if name.is_empty() {
        errors.push(format!(
            "under features and then {namespace} and then {subkey} names must not be empty"
        ));
    } else if name.contains([',', '(', ')']) || namespace.contains([',', '(', ')']) {
        errors.push(format!(
            "feature {namespace}.{name} contains a reserved character (one of \",()\")"
        ));
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn valid_spec_passes() {
        let v = json!({
            "features": { "ft": { "node": ["text", "suffix"], "edge": ["mother"] } },
            "xmlids": { "node": true, "edge": false },
            "primary": true,
            "prepare": { "zG00(node_sort)": { "method": "by_anchor" } }
        });
        validate_value(&v).unwrap();
    }

    #[test]
    fn typed_extraction_preserves_order() {
        let v = json!({
            "features": {
                "sft": { "node": ["verse"] },
                "ft": { "node": ["text", "suffix"] }
            },
            "prepare": { "b_step": 1, "a_step": 2 }
        });
        let spec = LoadSpec::from_value(&v).unwrap();
        let namespaces: Vec<&str> =
            spec.features.iter().map(|f| f.namespace.as_str()).collect();
        assert_eq!(namespaces, vec!["sft", "ft"]);
        assert_eq!(spec.features[1].node, vec!["text", "suffix"]);
        let steps: Vec<&String> = spec.prepare.keys().collect();
        assert_eq!(steps, vec!["b_step", "a_step"]);
        assert!(!spec.primary);
        assert!(!spec.xmlids.node);
    }

    #[test]
    fn unknown_section_reports_allowed_set() {
        let v = json!({ "structure": true });
        let err = validate_value(&v).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("only these sections are allowed: features, xmlids, primary, prepare; not structure"));
    }

    #[test]
    fn all_violations_are_aggregated() {
        let v = json!({
            "structure": true,
            "primary": "yes",
            "features": { "ns": { "node": true } }
        });
        let err = validate_value(&v).unwrap_err();
        let AnnographError::SpecShape { report } = err else {
            panic!("expected SpecShape");
        };
        assert_eq!(report.lines().count(), 3);
        assert!(report.contains("not structure"));
        assert!(report.contains("under primary only these values are allowed"));
        assert!(report.contains("under features and then ns and then node the value should be a list"));
    }

    #[test]
    fn prepare_must_be_a_mapping() {
        let v = json!({ "prepare": ["step_one", "step_two"] });
        let err = validate_value(&v).unwrap_err();
        assert!(err
            .to_string()
            .contains("the value of prepare should be an ordered mapping, not a list"));
    }

    #[test]
    fn xmlids_subkeys_and_values_are_checked() {
        let v = json!({ "xmlids": { "node": 1, "region": true } });
        let AnnographError::SpecShape { report } = validate_value(&v).unwrap_err() else {
            panic!("expected SpecShape");
        };
        assert!(report.contains("under xmlids and then node only these values are allowed"));
        assert!(report.contains("under xmlids only these keys are allowed: node, edge; not region"));
    }

    #[test]
    fn separator_in_feature_name_is_rejected() {
        let v = json!({ "features": { "ft": { "node": ["text,suffix"] } } });
        let err = validate_value(&v).unwrap_err();
        assert!(err.to_string().contains("reserved character"));
    }

    #[test]
    fn non_object_spec_is_rejected() {
        assert_matches!(
            validate_value(&json!([1, 2])),
            Err(AnnographError::SpecShape { .. })
        );
    }

    #[test]
    fn from_json_str_reports_parse_errors_as_shape_errors() {
        assert_matches!(
            LoadSpec::from_json_str("{not json"),
            Err(AnnographError::SpecShape { .. })
        );
    }
}
