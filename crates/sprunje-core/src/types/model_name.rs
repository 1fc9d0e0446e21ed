use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// A model identifier: the route segment used to address a schema, e.g. `users`.
///
/// Must match `^[A-Za-z_][A-Za-z0-9_]*$` per the request resolver's model-name rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelName(String);

impl ModelName {
    /// Creates a new `ModelName`, validating `^[A-Za-z_][A-Za-z0-9_]*$`.
    pub fn new(s: impl Into<String>) -> Result<Self, SchemaError> {
        let s = s.into();
        if !is_valid_model_name(&s) {
            return Err(SchemaError::InvalidModelName(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_model_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ModelName> for String {
    fn from(n: ModelName) -> String {
        n.0
    }
}

impl TryFrom<String> for ModelName {
    type Error = SchemaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl AsRef<str> for ModelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        for name in ["users", "_private", "group2", "CRM", "a"] {
            assert!(ModelName::new(name).is_ok(), "expected valid: {name}");
        }
    }

    #[test]
    fn invalid_names() {
        for name in ["", "2users", "my-model", "users@db", "my model"] {
            assert!(ModelName::new(name).is_err(), "expected invalid: {name}");
        }
    }

    #[test]
    fn display_roundtrip() {
        let name = ModelName::new("groups").unwrap();
        assert_eq!(name.to_string(), "groups");
        assert_eq!(name.as_str(), "groups");
    }

    #[test]
    fn serde_roundtrip() {
        let name = ModelName::new("roles").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"roles\"");
        let back: ModelName = serde_json::from_str(&json).unwrap();
        assert_eq!(name, back);
    }

    #[test]
    fn serde_rejects_invalid() {
        let result = serde_json::from_str::<ModelName>("\"bad-name\"");
        assert!(result.is_err());
    }
}
