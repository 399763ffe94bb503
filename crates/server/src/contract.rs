//! Declarative tool input contracts.
//!
//! Every tool declares its arguments as a static list of [`Field`]s. The same declaration is used
//! to advertise the JSON input schema in `tools/list` and, compiled with `jsonschema`, to
//! validate `tools/call` arguments in [`validate_arguments`] before anything touches the network.

use crate::error::{ValidationError, Violation};
use jsonschema::error::ValidationErrorKind;
use rmcp::model::JsonObject;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A string. With `allow_empty = false` the empty string is rejected.
    Text { allow_empty: bool },
    /// A non-empty string used as one URL path segment; `.` and `..` are rejected.
    Segment,
    /// A whole number in `min..=max`.
    Integer { min: i64, max: i64 },
    Boolean,
    /// A nested object accepting only the listed fields.
    Object(&'static [Field]),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

impl Field {
    #[must_use]
    pub const fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    #[must_use]
    pub const fn optional(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

/// JSON Schema (object) describing a field list.
#[must_use]
pub fn input_schema(fields: &[Field]) -> JsonObject {
    let mut properties = Map::new();
    let mut required: Vec<Value> = Vec::new();

    for field in fields {
        let mut prop = field_schema(field.kind);
        if !field.description.is_empty() {
            prop.insert("description".to_string(), json!(field.description));
        }
        properties.insert(field.name.to_string(), Value::Object(prop));
        if field.required {
            required.push(json!(field.name));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    schema.insert("additionalProperties".to_string(), json!(false));
    schema
}

fn field_schema(kind: FieldKind) -> JsonObject {
    let schema = match kind {
        FieldKind::Text { allow_empty } => {
            if allow_empty {
                json!({ "type": "string" })
            } else {
                json!({ "type": "string", "minLength": 1 })
            }
        }
        FieldKind::Segment => json!({
            "type": "string",
            "minLength": 1,
            "not": { "enum": [".", ".."] }
        }),
        FieldKind::Integer { min, max } => {
            json!({ "type": "integer", "minimum": min, "maximum": max })
        }
        FieldKind::Boolean => json!({ "type": "boolean" }),
        FieldKind::Object(fields) => Value::Object(input_schema(fields)),
    };
    match schema {
        Value::Object(o) => o,
        _ => JsonObject::new(),
    }
}

/// Check `arguments` against `fields`, collecting every violation.
///
/// Unknown and missing parameters are found by walking the contract so they can carry
/// suggestions; types, bounds and lengths are checked by compiling the advertised schema with
/// `jsonschema`. `null` is treated like an absent value.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing all violations found.
pub fn validate_arguments(fields: &[Field], arguments: &Value) -> Result<(), ValidationError> {
    let empty = Map::new();
    let obj = match arguments {
        Value::Null => &empty,
        Value::Object(obj) => obj,
        _ => {
            return Err(ValidationError::new(vec![Violation::constraint(
                "",
                "arguments must be an object".to_string(),
            )]));
        }
    };

    let mut violations = Vec::new();
    check_names(fields, obj, "", &mut violations);

    let schema = Value::Object(input_schema(fields));
    let instance = without_nulls(obj);
    match jsonschema::validator_for(&schema) {
        Ok(validator) => {
            for e in validator.iter_errors(&instance) {
                // Already reported above, with suggestions.
                if matches!(
                    e.kind(),
                    ValidationErrorKind::Required { .. }
                        | ValidationErrorKind::AdditionalProperties { .. }
                ) {
                    continue;
                }
                let path = pointer_to_path(&e.instance_path().to_string());
                violations.push(Violation::constraint(&path, e.to_string()));
            }
        }
        Err(e) => violations.push(Violation::constraint(
            "",
            format!("input schema does not compile: {e}"),
        )),
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(violations))
    }
}

/// Unknown and missing parameters, recursing into nested objects.
fn check_names(
    fields: &[Field],
    obj: &Map<String, Value>,
    prefix: &str,
    violations: &mut Vec<Violation>,
) {
    let known: Vec<&str> = fields.iter().map(|f| f.name).collect();
    for key in obj.keys() {
        if !known.contains(&key.as_str()) {
            let suggestions = find_similar_strings(key, &known);
            violations.push(Violation::unknown(&join_path(prefix, key), suggestions));
        }
    }

    for field in fields {
        let path = join_path(prefix, field.name);
        match obj.get(field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    violations.push(Violation::missing(&path));
                }
            }
            Some(Value::Object(nested)) => {
                if let FieldKind::Object(nested_fields) = field.kind {
                    check_names(nested_fields, nested, &path, violations);
                }
            }
            Some(_) => {}
        }
    }
}

/// Drop `null` members at every object level so the schema sees them as absent.
fn without_nulls(obj: &Map<String, Value>) -> Value {
    Value::Object(
        obj.iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                let v = match v {
                    Value::Object(nested) => without_nulls(nested),
                    other => other.clone(),
                };
                (k.clone(), v)
            })
            .collect(),
    )
}

/// `/githubRepoContext/startingBranch` -> `githubRepoContext.startingBranch`.
fn pointer_to_path(pointer: &str) -> String {
    pointer
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn find_similar_strings(unknown: &str, known: &[&str]) -> Vec<String> {
    let mut candidates: Vec<(f64, String)> = Vec::new();
    for k in known {
        let score = strsim::jaro(unknown, k);
        if score > 0.7 {
            candidates.push((score, (*k).to_string()));
        }
    }
    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    candidates.into_iter().map(|(_, s)| s).collect()
}
