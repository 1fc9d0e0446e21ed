use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Rendering style for a boolean field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanStyle {
    Plain,
    YesNo,
    Toggle,
}

/// The declared type of a field, as named in a schema file's `type` string.
///
/// Parsing and rendering are table-driven (`from_str`/`Display`) so that a new
/// type is added in one place, not threaded through every call site.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldType {
    String,
    Text,
    Integer,
    Float,
    Decimal,
    Boolean(BooleanStyle),
    Date,
    DateTime,
    Email,
    Url,
    Phone,
    Zip,
    Password,
    Json,
    SmartLookup,
    Address,
    Textarea { rows: Option<u32>, cols: Option<u32> },
}

impl FieldType {
    /// True for types whose raw client input is a string that should only be
    /// trimmed, never numerically coerced.
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Text
                | Self::Email
                | Self::Url
                | Self::Phone
                | Self::Zip
                | Self::Password
                | Self::SmartLookup
                | Self::Address
                | Self::Textarea { .. }
        )
    }

    /// True for field types whose sprunje filter match mode is exact equality
    /// rather than case-insensitive substring (§4.4: "numeric/boolean/date").
    pub fn is_exact_match_type(&self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::Float
                | Self::Decimal
                | Self::Boolean(_)
                | Self::Date
                | Self::DateTime
        )
    }

    /// `password` never appears in `list` or `detail` contexts (§9 design notes).
    pub fn is_password(&self) -> bool {
        matches!(self, Self::Password)
    }
}

impl std::str::FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw {
            "string" => Self::String,
            "text" => Self::Text,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "decimal" => Self::Decimal,
            "boolean" => Self::Boolean(BooleanStyle::Plain),
            "boolean-yn" => Self::Boolean(BooleanStyle::YesNo),
            "boolean-tgl" | "boolean-toggle" => Self::Boolean(BooleanStyle::Toggle),
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "email" => Self::Email,
            "url" => Self::Url,
            "phone" => Self::Phone,
            "zip" => Self::Zip,
            "password" => Self::Password,
            "json" => Self::Json,
            "smartlookup" => Self::SmartLookup,
            "address" => Self::Address,
            "textarea" => Self::Textarea { rows: None, cols: None },
            other if other.starts_with("textarea-r") => parse_textarea(other)?,
            other => return Err(SchemaError::UnknownFieldType(other.to_string())),
        })
    }
}

fn parse_textarea(raw: &str) -> Result<FieldType, SchemaError> {
    let rest = raw.strip_prefix("textarea-r").unwrap();
    let (rows_str, cols_str) = rest
        .split_once('c')
        .ok_or_else(|| SchemaError::UnknownFieldType(raw.to_string()))?;
    let rows: u32 = rows_str
        .parse()
        .map_err(|_| SchemaError::UnknownFieldType(raw.to_string()))?;
    let cols: u32 = cols_str
        .parse()
        .map_err(|_| SchemaError::UnknownFieldType(raw.to_string()))?;
    Ok(FieldType::Textarea {
        rows: Some(rows),
        cols: Some(cols),
    })
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Decimal => write!(f, "decimal"),
            Self::Boolean(BooleanStyle::Plain) => write!(f, "boolean"),
            Self::Boolean(BooleanStyle::YesNo) => write!(f, "boolean-yn"),
            Self::Boolean(BooleanStyle::Toggle) => write!(f, "boolean-tgl"),
            Self::Date => write!(f, "date"),
            Self::DateTime => write!(f, "datetime"),
            Self::Email => write!(f, "email"),
            Self::Url => write!(f, "url"),
            Self::Phone => write!(f, "phone"),
            Self::Zip => write!(f, "zip"),
            Self::Password => write!(f, "password"),
            Self::Json => write!(f, "json"),
            Self::SmartLookup => write!(f, "smartlookup"),
            Self::Address => write!(f, "address"),
            Self::Textarea { rows: None, .. } => write!(f, "textarea"),
            Self::Textarea {
                rows: Some(r),
                cols: Some(c),
            } => write!(f, "textarea-r{r}c{c}"),
            Self::Textarea { rows: Some(r), cols: None } => write!(f, "textarea-r{r}c0"),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
