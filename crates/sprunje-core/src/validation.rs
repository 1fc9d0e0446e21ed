use std::collections::BTreeMap;

use regex::Regex;

use crate::types::dynamic_value::DynamicValue;
use crate::types::field_spec::FieldSpec;
use crate::types::field_type::FieldType;
use crate::types::schema::ModelSchema;
use crate::types::validation_rule::ValidationRule;

/// The result of running the Validator/Transformer over a client-submitted
/// field map (§4.5): either a cleaned, type-coerced map ready for
/// persistence, or a `{field: [ruleName, ...]}` error map.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid(BTreeMap<String, DynamicValue>),
    Invalid(BTreeMap<String, Vec<String>>),
}

/// Runs Transform, Validate, and Defaults over `input` (§4.5).
///
/// Readonly/auto-increment/computed fields are dropped silently rather than
/// rejected, since the Model Binder never assigns them from client input
/// regardless. On create, absent fields take their schema default; on
/// update, an absent field is left untouched rather than treated as empty.
pub fn validate_and_transform(
    schema: &ModelSchema,
    input: &BTreeMap<String, DynamicValue>,
    is_create: bool,
) -> ValidationOutcome {
    let mut cleaned = BTreeMap::new();
    let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for field in &schema.fields {
        if !field.is_client_writable() {
            continue;
        }

        let provided = input.get(&field.name);
        let value = match provided {
            Some(v) => transform_value(field, v.clone()),
            None if is_create => field.default.clone().unwrap_or(DynamicValue::Null),
            None => continue,
        };

        let mut field_errors = Vec::new();
        let required = field.required || field.validation.contains(&ValidationRule::Required);
        if required && value.is_empty_for_validation() {
            field_errors.push(ValidationRule::Required.rule_name().to_string());
        }
        for rule in &field.validation {
            if matches!(rule, ValidationRule::Required) {
                continue;
            }
            if let Some(msg) = check_rule(rule, &value, input) {
                field_errors.push(msg);
            }
        }

        if field_errors.is_empty() {
            cleaned.insert(field.name.clone(), value);
        } else {
            errors.insert(field.name.clone(), field_errors);
        }
    }

    if errors.is_empty() {
        ValidationOutcome::Valid(cleaned)
    } else {
        ValidationOutcome::Invalid(errors)
    }
}

/// Trims text input and, for non-text-like field types, attempts to coerce a
/// raw string (as arrives from a form post) into the declared type.
fn transform_value(field: &FieldSpec, value: DynamicValue) -> DynamicValue {
    match value {
        DynamicValue::Text(s) if field.field_type.is_text_like() => {
            DynamicValue::Text(s.trim().to_string())
        }
        DynamicValue::Text(s) => coerce_non_text(&field.field_type, s.trim()),
        other => other,
    }
}

fn coerce_non_text(field_type: &FieldType, s: &str) -> DynamicValue {
    match field_type {
        FieldType::Integer => s
            .parse::<i64>()
            .map(DynamicValue::Integer)
            .unwrap_or_else(|_| DynamicValue::Text(s.to_string())),
        FieldType::Float | FieldType::Decimal => s
            .parse::<f64>()
            .map(DynamicValue::Float)
            .unwrap_or_else(|_| DynamicValue::Text(s.to_string())),
        FieldType::Boolean(_) => match s {
            "true" | "1" | "yes" | "on" => DynamicValue::Boolean(true),
            "false" | "0" | "no" | "off" | "" => DynamicValue::Boolean(false),
            _ => DynamicValue::Text(s.to_string()),
        },
        _ => DynamicValue::Text(s.to_string()),
    }
}

/// `Unique` is delegated to the backend, which enforces it at the database
/// constraint level and reports violations as a Conflict error (§7); this
/// layer never has visibility into persisted rows, so it always passes.
fn check_rule(
    rule: &ValidationRule,
    value: &DynamicValue,
    input: &BTreeMap<String, DynamicValue>,
) -> Option<String> {
    let fail = || Some(rule.rule_name().to_string());
    match rule {
        ValidationRule::Required => None,
        ValidationRule::Unique => None,
        ValidationRule::LengthMin(min) => {
            let len = value.as_str()?.chars().count();
            if len < *min {
                fail()
            } else {
                None
            }
        }
        ValidationRule::LengthMax(max) => {
            let len = value.as_str()?.chars().count();
            if len > *max {
                fail()
            } else {
                None
            }
        }
        ValidationRule::Numeric => {
            if value.as_i64().is_some() || value.as_f64().is_some() {
                None
            } else {
                fail()
            }
        }
        ValidationRule::Min(min) => {
            let n = value.as_f64()?;
            if n < *min {
                fail()
            } else {
                None
            }
        }
        ValidationRule::Max(max) => {
            let n = value.as_f64()?;
            if n > *max {
                fail()
            } else {
                None
            }
        }
        ValidationRule::Email => {
            let s = value.as_str()?;
            if s.contains('@') && s.split('@').nth(1).is_some_and(|domain| domain.contains('.')) {
                None
            } else {
                fail()
            }
        }
        ValidationRule::Match(other_field) => {
            let s = value.as_str();
            let other = input.get(other_field).and_then(DynamicValue::as_str);
            if s == other {
                None
            } else {
                fail()
            }
        }
        ValidationRule::Pattern(pattern) => {
            let s = value.as_str()?;
            match Regex::new(pattern) {
                Ok(re) if re.is_match(s) => None,
                _ => fail(),
            }
        }
    }
}
