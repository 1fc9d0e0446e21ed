use std::fmt;

/// Errors that occur when constructing, parsing, or validating schema types.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    /// Model name failed the `^[A-Za-z_][A-Za-z0-9_]*$` rule.
    InvalidModelName(String),
    /// Field name failed snake_case validation.
    InvalidFieldName(String),
    /// A `type` string did not match any known field type.
    UnknownFieldType(String),
    /// Schema definition has no fields.
    EmptyFields,
    /// Duplicate field name in a schema.
    DuplicateFieldName(String),
    /// Schema JSON was missing a required top-level attribute.
    MissingAttribute(&'static str),
    /// A JSON document under the schema directory failed to parse.
    MalformedJson { model: String, reason: String },
    /// A `RelationshipSpec` was missing fields required by its `type`.
    InvalidRelationship { name: String, reason: String },
    /// An `ActionSpec` was missing fields required by its `type`.
    InvalidAction { key: String, reason: String },
    /// A `default` value could not be coerced to the field's declared type.
    InvalidDefaultValue { field: String, reason: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidModelName(s) => {
                write!(
                    f,
                    "invalid model name '{s}': must match ^[A-Za-z_][A-Za-z0-9_]*$"
                )
            }
            Self::InvalidFieldName(s) => {
                write!(
                    f,
                    "invalid field name '{s}': must be snake_case [a-z][a-z0-9_]*"
                )
            }
            Self::UnknownFieldType(t) => write!(f, "unknown field type '{t}'"),
            Self::EmptyFields => write!(f, "schema must have at least one field"),
            Self::DuplicateFieldName(n) => write!(f, "duplicate field name '{n}'"),
            Self::MissingAttribute(attr) => write!(f, "schema is missing required attribute '{attr}'"),
            Self::MalformedJson { model, reason } => {
                write!(f, "schema '{model}' is malformed: {reason}")
            }
            Self::InvalidRelationship { name, reason } => {
                write!(f, "relationship '{name}' is invalid: {reason}")
            }
            Self::InvalidAction { key, reason } => {
                write!(f, "action '{key}' is invalid: {reason}")
            }
            Self::InvalidDefaultValue { field, reason } => {
                write!(f, "default value for field '{field}' is invalid: {reason}")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let cases = vec![
            (SchemaError::InvalidModelName("2x".into()), "invalid model name '2x'"),
            (SchemaError::InvalidFieldName("Foo".into()), "invalid field name 'Foo'"),
            (SchemaError::UnknownFieldType("blob".into()), "unknown field type 'blob'"),
            (SchemaError::EmptyFields, "schema must have at least one field"),
            (SchemaError::DuplicateFieldName("name".into()), "duplicate field name 'name'"),
            (
                SchemaError::MissingAttribute("table"),
                "schema is missing required attribute 'table'",
            ),
        ];

        for (error, expected_prefix) in cases {
            let msg = error.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error display for {error:?} = '{msg}', expected to start with '{expected_prefix}'"
            );
        }
    }

    #[test]
    fn error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(SchemaError::InvalidModelName("x".into()));
        assert!(err.to_string().contains("invalid model name"));
    }
}
