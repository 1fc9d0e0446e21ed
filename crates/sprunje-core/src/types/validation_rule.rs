use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single named validation rule attached to a field, as declared in the
/// schema file's `validation` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ValidationRule {
    Required,
    LengthMin(usize),
    LengthMax(usize),
    Numeric,
    Min(f64),
    Max(f64),
    Email,
    Unique,
    /// Confirmation field name that must equal this field's value.
    Match(String),
    Pattern(String),
}

impl ValidationRule {
    /// The rule name as it appears in a validator's `{field: [ruleName, ...]}` error map.
    pub fn rule_name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::LengthMin(_) => "length.min",
            Self::LengthMax(_) => "length.max",
            Self::Numeric => "numeric",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Email => "email",
            Self::Unique => "unique",
            Self::Match(_) => "match",
            Self::Pattern(_) => "pattern",
        }
    }
}

/// Parses the schema file's `validation` object (a map of rule name to
/// rule-specific config) into a `Vec<ValidationRule>`, matching the
/// `length.min`/`length.max` dotted-key convention of §3.1.
pub fn parse_validation_map(
    raw: &BTreeMap<String, serde_json::Value>,
) -> Vec<ValidationRule> {
    let mut rules = Vec::new();
    for (key, value) in raw {
        let rule = match key.as_str() {
            "required" if value.as_bool() != Some(false) => Some(ValidationRule::Required),
            "length.min" => value.as_u64().map(|v| ValidationRule::LengthMin(v as usize)),
            "length.max" => value.as_u64().map(|v| ValidationRule::LengthMax(v as usize)),
            "numeric" if value.as_bool() != Some(false) => Some(ValidationRule::Numeric),
            "min" => value.as_f64().map(ValidationRule::Min),
            "max" => value.as_f64().map(ValidationRule::Max),
            "email" if value.as_bool() != Some(false) => Some(ValidationRule::Email),
            "unique" if value.as_bool() != Some(false) => Some(ValidationRule::Unique),
            "match" => value.as_str().map(|s| ValidationRule::Match(s.to_string())),
            "pattern" => value.as_str().map(|s| ValidationRule::Pattern(s.to_string())),
            _ => None,
        };
        if let Some(rule) = rule {
            rules.push(rule);
        }
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_names() {
        assert_eq!(ValidationRule::Required.rule_name(), "required");
        assert_eq!(ValidationRule::LengthMin(3).rule_name(), "length.min");
        assert_eq!(ValidationRule::LengthMax(3).rule_name(), "length.max");
        assert_eq!(ValidationRule::Email.rule_name(), "email");
        assert_eq!(ValidationRule::Match("x".into()).rule_name(), "match");
    }

    #[test]
    fn parse_validation_map_builds_rules() {
        let mut raw = BTreeMap::new();
        raw.insert("required".to_string(), serde_json::json!(true));
        raw.insert("length.min".to_string(), serde_json::json!(3));
        raw.insert("email".to_string(), serde_json::json!(true));
        let rules = parse_validation_map(&raw);
        assert_eq!(rules.len(), 3);
        assert!(rules.contains(&ValidationRule::Required));
        assert!(rules.contains(&ValidationRule::LengthMin(3)));
        assert!(rules.contains(&ValidationRule::Email));
    }

    #[test]
    fn parse_validation_map_ignores_unknown_keys() {
        let mut raw = BTreeMap::new();
        raw.insert("bogus".to_string(), serde_json::json!(true));
        assert!(parse_validation_map(&raw).is_empty());
    }

    #[test]
    fn parse_validation_map_skips_false_boolean_rules() {
        let mut raw = BTreeMap::new();
        raw.insert("required".to_string(), serde_json::json!(false));
        assert!(parse_validation_map(&raw).is_empty());
    }
}
