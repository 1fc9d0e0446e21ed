use serde::{Deserialize, Serialize};

/// Runtime value for any field type: the tagged union backing the "open
/// mapping of names to values" dynamic row model (see design notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum DynamicValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
}

impl DynamicValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for values that count as "empty" for the `required` validation rule.
    pub fn is_empty_for_validation(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            Self::Json(v) => v.is_null(),
            _ => false,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Json(v) => v.clone(),
        }
    }

    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::Null
                }
            }
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Json(other),
        }
    }
}

impl std::fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_primitives() {
        assert_eq!(DynamicValue::Null.to_string(), "null");
        assert_eq!(DynamicValue::Text("hi".into()).to_string(), "hi");
        assert_eq!(DynamicValue::Integer(42).to_string(), "42");
        assert_eq!(DynamicValue::Boolean(true).to_string(), "true");
    }

    #[test]
    fn serde_roundtrip_primitives() {
        let values = vec![
            DynamicValue::Null,
            DynamicValue::Text("hello".into()),
            DynamicValue::Integer(42),
            DynamicValue::Float(2.5),
            DynamicValue::Boolean(false),
        ];
        for v in values {
            let json = serde_json::to_string(&v).unwrap();
            let back: DynamicValue = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn is_empty_for_validation() {
        assert!(DynamicValue::Null.is_empty_for_validation());
        assert!(DynamicValue::Text(String::new()).is_empty_for_validation());
        assert!(!DynamicValue::Text("x".into()).is_empty_for_validation());
        assert!(!DynamicValue::Integer(0).is_empty_for_validation());
    }

    #[test]
    fn from_json_picks_integer_over_float() {
        let v = DynamicValue::from_json(serde_json::json!(42));
        assert_eq!(v, DynamicValue::Integer(42));
    }

    #[test]
    fn from_json_object_becomes_json_variant() {
        let v = DynamicValue::from_json(serde_json::json!({"a": 1}));
        assert!(matches!(v, DynamicValue::Json(_)));
    }

    #[test]
    fn to_json_roundtrip() {
        let v = DynamicValue::Text("abc".into());
        assert_eq!(v.to_json(), serde_json::json!("abc"));
    }

    #[test]
    fn as_f64_widens_integer() {
        assert_eq!(DynamicValue::Integer(5).as_f64(), Some(5.0));
        assert_eq!(DynamicValue::Float(5.5).as_f64(), Some(5.5));
        assert_eq!(DynamicValue::Text("x".into()).as_f64(), None);
    }
}
