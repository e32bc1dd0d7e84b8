//! Feature Vector Validator
//!
//! Turns an untyped JSON body into a [`FeatureRecord`]. Every offending field
//! is reported, not only the first, so the caller can fix a request in one go.
//!
//! Rules:
//! - body must be an object with exactly the layout's fields
//! - continuous fields take any JSON number (integers are widened)
//! - flag fields take a JSON integer 0 or 1, nothing else

use serde::Serialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::logic::layout::{feature_kind, FeatureKind, FEATURE_LAYOUT};
use crate::models::FeatureRecord;

/// One field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a request body against the feature layout
pub fn validate_record(body: &Value) -> Result<FeatureRecord, Vec<FieldError>> {
    let map = match body {
        Value::Object(map) => map,
        other => {
            return Err(vec![FieldError::new(
                "body",
                format!("expected a JSON object, got {}", json_type(other)),
            )])
        }
    };

    let mut errors = check_structure(map);
    if !errors.is_empty() {
        return Err(errors);
    }

    let record: FeatureRecord = serde_json::from_value(body.clone())
        .map_err(|e| vec![FieldError::new("body", e.to_string())])?;

    if let Err(range_errors) = record.validate() {
        let mut fields: Vec<_> = range_errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(name, _)| crate::logic::layout::feature_index(name));

        for (field, field_errors) in fields {
            for e in field_errors.iter() {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                errors.push(FieldError::new(field.to_string(), message));
            }
        }
        return Err(errors);
    }

    Ok(record)
}

/// Missing, mistyped and unexpected fields, in layout order then extras by name
fn check_structure(map: &Map<String, Value>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (i, name) in FEATURE_LAYOUT.iter().enumerate() {
        let Some(value) = map.get(*name) else {
            errors.push(FieldError::new(*name, "field required"));
            continue;
        };

        match feature_kind(i) {
            FeatureKind::Continuous => {
                if !value.is_number() {
                    errors.push(FieldError::new(
                        *name,
                        format!("expected a number, got {}", json_type(value)),
                    ));
                }
            }
            FeatureKind::Flag => {
                if value.is_u64() && value.as_i64().is_none() {
                    errors.push(FieldError::new(*name, "flag must be 0 or 1"));
                } else if value.as_i64().is_none() {
                    errors.push(FieldError::new(
                        *name,
                        format!("expected an integer flag (0 or 1), got {}", json_type(value)),
                    ));
                }
            }
        }
    }

    let mut extras: Vec<&String> = map
        .keys()
        .filter(|k| !FEATURE_LAYOUT.contains(&k.as_str()))
        .collect();
    extras.sort();
    for extra in extras {
        errors.push(FieldError::new(extra.as_str(), "unexpected field"));
    }

    errors
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn demo_body() -> Value {
        serde_json::to_value(crate::logic::demo::demo_candidate().features).unwrap()
    }

    #[test]
    fn test_accepts_demo_record() {
        let record = validate_record(&demo_body()).unwrap();
        assert_eq!(record.koi_period, 37.4242);
        assert_eq!(record.koi_fpflag_ec, 0);
    }

    #[test]
    fn test_integer_widened_for_continuous() {
        let mut body = demo_body();
        body["koi_steff"] = json!(3480);
        let record = validate_record(&body).unwrap();
        assert_eq!(record.koi_steff, 3480.0);
    }

    #[test]
    fn test_missing_field() {
        let mut body = demo_body();
        body.as_object_mut().unwrap().remove("koi_depth");

        let errors = validate_record(&body).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("koi_depth", "field required")]);
    }

    #[test]
    fn test_extra_field() {
        let mut body = demo_body();
        body["kepler_name"] = json!("Kepler-22 b");

        let errors = validate_record(&body).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "kepler_name");
    }

    #[test]
    fn test_wrong_types_all_reported() {
        let mut body = demo_body();
        body["koi_period"] = json!("37.4");
        body["koi_fpflag_nt"] = json!(1.0);
        body["koi_fpflag_co"] = json!(true);

        let errors = validate_record(&body).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["koi_period", "koi_fpflag_nt", "koi_fpflag_co"]);
        assert!(errors[0].message.contains("string"));
        assert!(errors[1].message.contains("float"));
    }

    #[test]
    fn test_flag_out_of_range() {
        let mut body = demo_body();
        body["koi_fpflag_ec"] = json!(3);
        body["koi_fpflag_ss"] = json!(-1);

        let errors = validate_record(&body).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["koi_fpflag_ss", "koi_fpflag_ec"]);
        assert_eq!(errors[0].message, "flag must be 0 or 1");
    }

    #[test]
    fn test_oversized_flag_names_its_field() {
        let mut body = demo_body();
        body["koi_fpflag_nt"] = json!(u64::MAX);

        let errors = validate_record(&body).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("koi_fpflag_nt", "flag must be 0 or 1")]);
    }

    #[test]
    fn test_non_object_body() {
        let errors = validate_record(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(errors[0].field, "body");
        assert!(errors[0].message.contains("array"));
    }

    #[test]
    fn test_null_is_not_a_number() {
        let mut body = demo_body();
        body["ra"] = Value::Null;
        let errors = validate_record(&body).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("ra", "expected a number, got null")]);
    }
}
