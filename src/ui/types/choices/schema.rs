use anyhow::{Context, Result, bail};
use schemars::Schema;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
}

/// One parameter of a choice, read back from its JSON schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub kind: FieldKind,
    pub default: Option<Value>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allowed: Option<Vec<String>>,
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<28} {:<8}", self.name, format!("{:?}", self.kind).to_lowercase())?;
        if let Some(default) = &self.default {
            write!(f, " default={default}")?;
        }
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => write!(f, " range=[{lo}, {hi}]")?,
            (Some(lo), None) => write!(f, " min={lo}")?,
            (None, Some(hi)) => write!(f, " max={hi}")?,
            (None, None) => {}
        }
        if let Some(allowed) = &self.allowed {
            write!(f, " one of {}", allowed.join("|"))?;
        }
        if let Some(description) = &self.description {
            write!(f, "  {description}")?;
        }
        Ok(())
    }
}

/// Parameters of the `kind_key` branch of a tagged choice schema.
pub fn specs_for_kind(root: &Schema, kind_key: &str) -> Result<Vec<FieldSpec>> {
    let root_obj = root.as_object().context("root schema is not an object")?;
    let branches = root_obj
        .get("oneOf")
        .or_else(|| root_obj.get("anyOf"))
        .and_then(Value::as_array)
        .context("missing oneOf/anyOf")?;

    for branch in branches {
        let Some(props) = branch.get("properties").and_then(Value::as_object) else {
            continue;
        };
        if !discriminant_matches(props, kind_key) {
            continue;
        }

        let Some(params) = props
            .get("params")
            .and_then(Value::as_object)
            .and_then(|o| resolve_ref_obj(root_obj, o))
        else {
            return Ok(Vec::new());
        };
        let Some(fields) = params.get("properties").and_then(Value::as_object) else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for (name, field) in fields {
            let Some(spec) = field
                .as_object()
                .and_then(|o| field_spec(root_obj, name, o))
            else {
                continue;
            };
            out.push(spec);
        }
        return Ok(out);
    }

    bail!("no branch found for type={kind_key}");
}

fn field_spec(root: &Map<String, Value>, name: &str, field: &Map<String, Value>) -> Option<FieldSpec> {
    let resolved = resolve_ref_obj(root, field)?;
    let kind = detect_field_kind(resolved.get("type").or_else(|| field.get("type")))?;
    let lookup = |key: &str| field.get(key).or_else(|| resolved.get(key));

    Some(FieldSpec {
        name: name.to_string(),
        title: lookup("title")
            .and_then(Value::as_str)
            .unwrap_or(name)
            .to_string(),
        description: lookup("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        kind,
        default: lookup("default").cloned(),
        min: lookup("minimum")
            .or_else(|| lookup("exclusiveMinimum"))
            .and_then(Value::as_f64),
        max: lookup("maximum")
            .or_else(|| lookup("exclusiveMaximum"))
            .and_then(Value::as_f64),
        allowed: lookup("enum").and_then(Value::as_array).map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        }),
    })
}

fn discriminant_matches(props: &Map<String, Value>, kind_key: &str) -> bool {
    let Some(tag) = props.get("type").and_then(Value::as_object) else {
        return false;
    };
    if tag.get("const").and_then(Value::as_str) == Some(kind_key) {
        return true;
    }
    tag.get("enum")
        .and_then(Value::as_array)
        .is_some_and(|a| a.len() == 1 && a[0].as_str() == Some(kind_key))
}

/// Follows a local `$ref` such as `#/$defs/SeaParameters`; objects without
/// one are returned as they are.
fn resolve_ref_obj<'a>(
    root: &'a Map<String, Value>,
    obj: &'a Map<String, Value>,
) -> Option<&'a Map<String, Value>> {
    let Some(Value::String(reference)) = obj.get("$ref") else {
        return Some(obj);
    };
    let path = reference.strip_prefix("#/")?;
    let mut current = root;
    for raw in path.split('/') {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        current = current.get(&segment)?.as_object()?;
    }
    Some(current)
}

fn primitive(name: &str) -> Option<FieldKind> {
    match name {
        "string" => Some(FieldKind::String),
        "integer" => Some(FieldKind::Integer),
        "number" => Some(FieldKind::Number),
        "boolean" => Some(FieldKind::Boolean),
        _ => None,
    }
}

/// `["null", "integer"]` unions of optional fields resolve to the non-null kind.
fn detect_field_kind(ty: Option<&Value>) -> Option<FieldKind> {
    match ty? {
        Value::String(s) => primitive(s),
        Value::Array(names) => names.iter().filter_map(Value::as_str).find_map(primitive),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::types::choices::{LearnerChoice, StreamChoice, UIChoice};
    use serde_json::json;

    #[test]
    fn test_field_kind_of_nullable_union() {
        let nullable = json!(["null", "integer"]);
        assert_eq!(detect_field_kind(Some(&nullable)), Some(FieldKind::Integer));
        assert_eq!(detect_field_kind(Some(&json!("object"))), None);
        assert_eq!(detect_field_kind(None), None);
    }

    #[test]
    fn test_ref_resolution_unescapes_segments() {
        let root = json!({ "$defs": { "a~b": { "inner/seg": { "type": "number" } } } });
        let reference = json!({ "$ref": "#/$defs/a~0b/inner~1seg" });
        let out = resolve_ref_obj(
            root.as_object().unwrap(),
            reference.as_object().unwrap(),
        )
        .unwrap();
        assert_eq!(out.get("type").and_then(Value::as_str), Some("number"));
    }

    #[test]
    fn test_learner_specs_carry_ranges_and_defaults() {
        let specs = specs_for_kind(&LearnerChoice::schema(), "plastic").unwrap();
        assert!(specs.iter().all(|s| s.name != "variant"));

        let grace = specs.iter().find(|s| s.name == "grace_period").unwrap();
        assert_eq!(grace.kind, FieldKind::Integer);
        assert_eq!(grace.default, Some(json!(200)));
        assert_eq!(grace.min, Some(1.0));

        let criterion = specs.iter().find(|s| s.name == "split_criterion").unwrap();
        assert_eq!(criterion.kind, FieldKind::String);
        let allowed = criterion.allowed.clone().unwrap_or_default();
        assert!(allowed.contains(&"gini".to_string()));
    }

    #[test]
    fn test_stream_specs_and_unknown_kind() {
        let schema = StreamChoice::schema();
        let specs = specs_for_kind(&schema, "sea-generator").unwrap();
        let function = specs.iter().find(|s| s.name == "function_id").unwrap();
        assert_eq!(function.max, Some(4.0));
        assert!(function.to_string().contains("range=[1, 4]"));

        let err = specs_for_kind(&schema, "does-not-exist").unwrap_err();
        assert!(err.to_string().contains("no branch found"));
    }
}
