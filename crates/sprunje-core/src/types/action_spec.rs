use crate::error::SchemaError;

/// The dispatch behavior of a custom action (§4.6.8).
#[derive(Debug, Clone, PartialEq)]
pub enum ActionType {
    FieldUpdate { field: String },
    PasswordUpdate,
    Custom,
}

/// A custom verb beyond the standard six, declared in a schema's `actions` list.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSpec {
    pub key: String,
    pub label: String,
    pub action_type: ActionType,
    pub permission: Option<String>,
    pub style: Option<String>,
    pub icon: Option<String>,
    pub confirm: bool,
    pub success_message: Option<String>,
}

pub fn action_spec_from_json(raw: &serde_json::Value) -> Result<ActionSpec, SchemaError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| SchemaError::MalformedJson {
            model: "action".into(),
            reason: "action entry must be a JSON object".into(),
        })?;
    let key = obj
        .get("key")
        .and_then(|v| v.as_str())
        .ok_or(SchemaError::MissingAttribute("key"))?
        .to_string();
    let label = obj
        .get("label")
        .and_then(|v| v.as_str())
        .unwrap_or(&key)
        .to_string();
    let type_str = obj.get("type").and_then(|v| v.as_str()).unwrap_or("custom");
    let action_type = match type_str {
        "field_update" => {
            let field = obj
                .get("field")
                .and_then(|v| v.as_str())
                .ok_or_else(|| SchemaError::InvalidAction {
                    key: key.clone(),
                    reason: "field_update actions require a 'field' attribute".into(),
                })?
                .to_string();
            ActionType::FieldUpdate { field }
        }
        "password_update" => ActionType::PasswordUpdate,
        "custom" => ActionType::Custom,
        other => {
            return Err(SchemaError::InvalidAction {
                key,
                reason: format!("unknown action type '{other}'"),
            })
        }
    };

    Ok(ActionSpec {
        key,
        label,
        action_type,
        permission: obj.get("permission").and_then(|v| v.as_str()).map(str::to_string),
        style: obj.get("style").and_then(|v| v.as_str()).map(str::to_string),
        icon: obj.get("icon").and_then(|v| v.as_str()).map(str::to_string),
        confirm: obj.get("confirm").and_then(|v| v.as_bool()).unwrap_or(false),
        success_message: obj
            .get("success_message")
            .and_then(|v| v.as_str())
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_update_action() {
        let a = action_spec_from_json(&serde_json::json!({
            "key": "enable",
            "type": "field_update",
            "field": "enabled"
        }))
        .unwrap();
        assert_eq!(a.action_type, ActionType::FieldUpdate { field: "enabled".into() });
    }

    #[test]
    fn field_update_without_field_is_error() {
        let err = action_spec_from_json(&serde_json::json!({
            "key": "enable",
            "type": "field_update"
        }));
        assert!(err.is_err());
    }

    #[test]
    fn defaults_to_custom_type() {
        let a = action_spec_from_json(&serde_json::json!({"key": "resend_invite"})).unwrap();
        assert_eq!(a.action_type, ActionType::Custom);
    }

    #[test]
    fn label_defaults_to_key() {
        let a = action_spec_from_json(&serde_json::json!({"key": "resend_invite"})).unwrap();
        assert_eq!(a.label, "resend_invite");
    }

    #[test]
    fn unknown_type_is_error() {
        let err = action_spec_from_json(&serde_json::json!({"key": "x", "type": "teleport"}));
        assert!(err.is_err());
    }
}
