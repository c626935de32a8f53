//! Shared tool-argument validation.
//!
//! Every tool call goes through [`validate_arguments`] before anything is sent upstream. The
//! outcome is tagged: either the coerced arguments, or a [`ValidationFailure`] listing every
//! violation found (unknown parameters, missing required parameters, broken pairs, and JSON
//! Schema constraint violations).

use crate::schema::{ParamType, RegisteredTool, ToolDescriptor};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Violation {
    /// The caller passed a parameter the tool does not declare.
    InvalidParameter {
        parameter: String,
        suggestions: Vec<String>,
        #[serde(rename = "validParameters")]
        valid_parameters: Vec<String>,
    },
    MissingRequiredParameter {
        parameter: String,
    },
    /// One half of a parameter pair was given without the other.
    MissingPairedParameter {
        parameter: String,
        #[serde(rename = "pairedWith")]
        paired_with: String,
    },
    ConstraintViolation {
        message: String,
        #[serde(rename = "instancePath")]
        instance_path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    pub message: String,
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Arguments that passed validation. Null values are dropped and numeric strings coerced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidatedArguments(Map<String, Value>);

impl ValidatedArguments {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Validate raw tool-call arguments against a registered tool.
///
/// # Errors
///
/// Returns a [`ValidationFailure`] carrying all violations when the arguments do not satisfy the
/// tool's declared parameters.
pub fn validate_arguments(
    tool: &RegisteredTool,
    args: &Value,
) -> Result<ValidatedArguments, ValidationFailure> {
    let descriptor = &tool.descriptor;

    let mut args_obj = match args {
        Value::Null => Map::new(),
        Value::Object(o) => o.clone(),
        other => {
            let message = format!(
                "Invalid params: arguments must be a JSON object, got {}",
                json_type_name(other)
            );
            return Err(ValidationFailure {
                message: message.clone(),
                violations: vec![Violation::ConstraintViolation {
                    message,
                    instance_path: String::new(),
                }],
            });
        }
    };
    args_obj.retain(|_, v| !v.is_null());

    let mut violations = unknown_parameter_violations(descriptor, &args_obj);

    for param in &descriptor.params {
        if let Some(value) = args_obj.get_mut(param.name) {
            coerce(param.ty, value);
        } else if param.required && param.default.is_none() {
            violations.push(Violation::MissingRequiredParameter {
                parameter: param.name.to_string(),
            });
        }
    }

    for (a, b) in &descriptor.pairs {
        match (args_obj.contains_key(*a), args_obj.contains_key(*b)) {
            (true, false) => violations.push(Violation::MissingPairedParameter {
                parameter: (*b).to_string(),
                paired_with: (*a).to_string(),
            }),
            (false, true) => violations.push(Violation::MissingPairedParameter {
                parameter: (*a).to_string(),
                paired_with: (*b).to_string(),
            }),
            _ => {}
        }
    }

    // JSON Schema validation (types/constraints).
    let instance = Value::Object(args_obj);
    for e in tool.validator.iter_errors(&instance) {
        // Required/unknown parameters are already reported with a nicer shape.
        if matches!(
            e.kind(),
            jsonschema::error::ValidationErrorKind::Required { .. }
                | jsonschema::error::ValidationErrorKind::AdditionalProperties { .. }
        ) {
            continue;
        }
        violations.push(Violation::ConstraintViolation {
            message: e.to_string(),
            instance_path: e.instance_path().to_string(),
        });
    }

    if violations.is_empty() {
        let Value::Object(map) = instance else {
            return Ok(ValidatedArguments::default());
        };
        return Ok(ValidatedArguments(map));
    }

    Err(ValidationFailure {
        message: failure_message(&violations),
        violations,
    })
}

fn unknown_parameter_violations(
    descriptor: &ToolDescriptor,
    args: &Map<String, Value>,
) -> Vec<Violation> {
    let valid_params: Vec<&str> = descriptor.params.iter().map(|p| p.name).collect();
    args.keys()
        .filter(|k| descriptor.find_param(k).is_none())
        .map(|k| Violation::InvalidParameter {
            parameter: k.clone(),
            suggestions: find_similar_strings(k, &valid_params),
            valid_parameters: valid_params.iter().map(|s| (*s).to_string()).collect(),
        })
        .collect()
}

fn coerce(ty: ParamType, value: &mut Value) {
    let coerced = match (ty, value.as_str()) {
        (ParamType::Integer, Some(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        // `60.0` satisfies the schema's `integer` but must go upstream as `60`.
        (ParamType::Integer, None) => value
            .as_f64()
            .filter(|_| !value.is_i64() && !value.is_u64())
            .and_then(whole_number)
            .map(Value::from),
        (ParamType::Number, Some(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    };
    if let Some(v) = coerced {
        *value = v;
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn whole_number(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f as i64)
}

fn failure_message(violations: &[Violation]) -> String {
    // Optimize for unknown-parameter typos (even if there are other violations too).
    if let Some(Violation::InvalidParameter {
        parameter,
        suggestions,
        ..
    }) = violations
        .iter()
        .find(|v| matches!(v, Violation::InvalidParameter { .. }))
    {
        return match suggestions.first() {
            Some(s) => {
                format!("Invalid params: unknown parameter '{parameter}' (did you mean '{s}'?)")
            }
            None => format!("Invalid params: unknown parameter '{parameter}'"),
        };
    }

    match violations {
        [Violation::MissingRequiredParameter { parameter }] => {
            format!("Invalid params: missing required parameter '{parameter}'")
        }
        [
            Violation::MissingPairedParameter {
                parameter,
                paired_with,
            },
        ] => format!("Invalid params: '{paired_with}' requires '{parameter}'"),
        [
            Violation::ConstraintViolation {
                message,
                instance_path,
            },
        ] => format!("Invalid params: {instance_path}: {message}"),
        _ => format!(
            "Invalid params: validation failed with {} error(s)",
            violations.len()
        ),
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

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CHECK_COVERAGE, CREATE_BOOKING, GET_BOOKING_MEDIA, snappr_tools};
    use crate::schema::ToolRegistry;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(snappr_tools()).expect("valid catalog")
    }

    fn validate(tool: &str, args: Value) -> Result<ValidatedArguments, ValidationFailure> {
        let registry = registry();
        let tool = registry.get(tool).expect("tool exists");
        validate_arguments(tool, &args)
    }

    #[test]
    fn accepts_required_arguments() {
        let ok = validate(
            CHECK_COVERAGE,
            json!({"address": "1 Main St, Austin, TX", "shoot_type": "food"}),
        )
        .expect("valid");
        assert_eq!(ok.get("shoot_type"), Some(&json!("food")));
    }

    #[test]
    fn reports_missing_required_parameter() {
        let err = validate(CHECK_COVERAGE, json!({"address": "1 Main St"})).unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::MissingRequiredParameter {
                parameter: "shoot_type".to_string()
            }]
        );
        assert_eq!(
            err.message,
            "Invalid params: missing required parameter 'shoot_type'"
        );
    }

    #[test]
    fn rejects_unknown_parameter_with_suggestion() {
        let err = validate(
            CHECK_COVERAGE,
            json!({"address": "1 Main St", "shoot_type": "food", "shootType": "food"}),
        )
        .unwrap_err();
        assert!(err.message.contains("unknown parameter 'shootType'"));
        assert!(err.message.contains("did you mean 'shoot_type'"));
    }

    #[test]
    fn coerces_numeric_strings() {
        let ok = validate(
            CREATE_BOOKING,
            json!({
                "shoot_type": "food",
                "location": "1 Main St",
                "start_time": "2026-11-02T10:00:00Z",
                "duration": "90",
                "contact_name": "Sam Lee",
                "contact_email": "sam@example.com",
            }),
        )
        .expect("valid");
        assert_eq!(ok.get("duration"), Some(&json!(90)));
    }

    #[test]
    fn whole_number_floats_become_integers() {
        let ok = validate(
            CREATE_BOOKING,
            json!({
                "shoot_type": "food",
                "location": "1 Main St",
                "start_time": "2026-11-02T10:00:00Z",
                "duration": 60.0,
                "contact_name": "Sam Lee",
                "contact_email": "sam@example.com",
            }),
        )
        .expect("valid");
        let duration = ok.get("duration").expect("duration");
        assert!(duration.is_i64(), "{duration:?}");
        assert_eq!(duration, &json!(60));
    }

    #[test]
    fn rejects_non_coercible_types() {
        let err = validate(
            CREATE_BOOKING,
            json!({
                "shoot_type": "food",
                "location": "1 Main St",
                "start_time": "2026-11-02T10:00:00Z",
                "duration": "an hour",
                "contact_name": "Sam Lee",
                "contact_email": "sam@example.com",
            }),
        )
        .unwrap_err();
        assert!(matches!(
            err.violations.as_slice(),
            [Violation::ConstraintViolation { instance_path, .. }] if instance_path == "/duration"
        ));
    }

    #[test]
    fn null_values_count_as_absent() {
        let err = validate(
            CHECK_COVERAGE,
            json!({"address": null, "shoot_type": "food"}),
        )
        .unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::MissingRequiredParameter {
                parameter: "address".to_string()
            }]
        );
    }

    #[test]
    fn latitude_requires_longitude() {
        let err = validate(
            CHECK_COVERAGE,
            json!({"address": "1 Main St", "shoot_type": "food", "latitude": 30.27}),
        )
        .unwrap_err();
        assert_eq!(err.message, "Invalid params: 'latitude' requires 'longitude'");
    }

    #[test]
    fn enforces_media_type_enum() {
        let err = validate(
            GET_BOOKING_MEDIA,
            json!({"booking_id": "bk_1", "media_type": "audio"}),
        )
        .unwrap_err();
        assert!(matches!(
            err.violations.as_slice(),
            [Violation::ConstraintViolation { .. }]
        ));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let err = validate(CHECK_COVERAGE, json!(["1 Main St", "food"])).unwrap_err();
        assert!(err.message.contains("must be a JSON object"));
    }

    #[test]
    fn collects_every_violation() {
        let err = validate(CREATE_BOOKING, json!({"shoot_type": "food"})).unwrap_err();
        assert_eq!(err.violations.len(), 5);
        assert_eq!(
            err.message,
            "Invalid params: validation failed with 5 error(s)"
        );
    }

    #[test]
    fn violations_serialize_with_kebab_case_tags() {
        let v = serde_json::to_value(Violation::InvalidParameter {
            parameter: "adress".to_string(),
            suggestions: vec!["address".to_string()],
            valid_parameters: vec!["address".to_string()],
        })
        .expect("serializes");
        assert_eq!(v["type"], "invalid-parameter");
        assert_eq!(v["validParameters"], json!(["address"]));
    }
}
