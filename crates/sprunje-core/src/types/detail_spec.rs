use crate::error::SchemaError;

/// A simple has-many relationship for nested listing (§3.1).
///
/// If `foreign_key` is absent, the relation is a many-to-many relationship
/// that must be matched by a [`super::relationship_spec::RelationshipSpec`]
/// of the same name (§4.7 resolution order).
#[derive(Debug, Clone, PartialEq)]
pub struct DetailSpec {
    pub model: String,
    pub foreign_key: Option<String>,
    pub list_fields: Vec<String>,
    pub title: Option<String>,
}

pub fn detail_spec_from_json(raw: &serde_json::Value) -> Result<DetailSpec, SchemaError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| SchemaError::MalformedJson {
            model: "detail".into(),
            reason: "detail entry must be a JSON object".into(),
        })?;
    let model = obj
        .get("model")
        .and_then(|v| v.as_str())
        .ok_or(SchemaError::MissingAttribute("model"))?
        .to_string();
    let foreign_key = obj
        .get("foreign_key")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let list_fields = obj
        .get("list_fields")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let title = obj.get("title").and_then(|v| v.as_str()).map(str::to_string);
    Ok(DetailSpec {
        model,
        foreign_key,
        list_fields,
        title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_to_many_detail() {
        let d = detail_spec_from_json(&serde_json::json!({
            "model": "permissions",
            "foreign_key": "role_id",
            "list_fields": ["name"]
        }))
        .unwrap();
        assert_eq!(d.model, "permissions");
        assert_eq!(d.foreign_key.as_deref(), Some("role_id"));
        assert_eq!(d.list_fields, vec!["name".to_string()]);
    }

    #[test]
    fn many_to_many_detail_has_no_foreign_key() {
        let d = detail_spec_from_json(&serde_json::json!({"model": "permissions"})).unwrap();
        assert!(d.foreign_key.is_none());
    }

    #[test]
    fn missing_model_is_error() {
        assert!(detail_spec_from_json(&serde_json::json!({})).is_err());
    }
}
