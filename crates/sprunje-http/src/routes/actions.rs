use std::collections::BTreeMap;

use axum::extract::{Extension, Path, State};
use axum::Json;
use sprunje_backend::{Principal, RecordStore};
use sprunje_core::{ActionType, DynamicValue, StandardAction, ValidationOutcome};

use crate::error::ApiError;
use crate::middleware::{check_permission, resolve_model, resolve_record};
use crate::password::hash_password;
use crate::state::AppState;

/// `POST /api/crud6/{model}/{id}/a/{actionKey}` (§4.6.8).
pub async fn custom_action(
    State(state): State<AppState>,
    Path((model_segment, pk_raw, action_key)): Path<(String, String, String)>,
    principal: Option<Extension<Principal>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ctx = resolve_model(&state, &model_segment).await?;
    let action = ctx
        .schema
        .actions
        .iter()
        .find(|a| a.key == action_key)
        .cloned()
        .ok_or_else(|| ApiError::NotFound {
            message: format!("model '{}' has no action named '{action_key}'", ctx.model.as_str()),
        })?;

    let permission = action
        .permission
        .clone()
        .unwrap_or_else(|| ctx.schema.permission_for(StandardAction::Update));
    check_permission(principal.as_ref().map(|Extension(p)| p), &permission)?;

    resolve_record(&ctx, &pk_raw).await?;
    let pk = crate::middleware::parse_pk(&ctx.schema, &pk_raw);

    let data = match &action.action_type {
        ActionType::FieldUpdate { field } => {
            let raw_value = body.get("value").cloned().unwrap_or(body.clone());
            let mut input = BTreeMap::new();
            input.insert(field.clone(), DynamicValue::from_json(raw_value));
            let fields = match sprunje_core::validate_and_transform(&ctx.schema, &input, false) {
                ValidationOutcome::Invalid(errors) => return Err(ApiError::Validation { errors }),
                ValidationOutcome::Valid(fields) => fields,
            };
            Some(ctx.store.update(&ctx.schema, &pk, fields).await?)
        }
        ActionType::PasswordUpdate => {
            let password = body
                .get("password")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ApiError::BadRequest { message: "'password' is required".into() })?;
            let confirm = body.get("password_confirmation").and_then(|v| v.as_str());
            if confirm.is_some_and(|c| c != password) {
                let mut errors = BTreeMap::new();
                errors.insert("password_confirmation".to_string(), vec!["must match password".to_string()]);
                return Err(ApiError::Validation { errors });
            }
            if password.len() < 8 {
                let mut errors = BTreeMap::new();
                errors.insert("password".to_string(), vec!["must be at least 8 characters".to_string()]);
                return Err(ApiError::Validation { errors });
            }

            let hashed = hash_password(password)?;
            let mut fields = BTreeMap::new();
            fields.insert("password".to_string(), DynamicValue::Text(hashed));
            Some(ctx.store.update(&ctx.schema, &pk, fields).await?)
        }
        ActionType::Custom => None,
    };

    let mut response = serde_json::json!({
        "title": "Success",
        "description": action
            .success_message
            .clone()
            .unwrap_or_else(|| format!("{} completed successfully.", action.label)),
        "model": ctx.model.as_str(),
        "id": pk,
    });
    if let Some(record) = data {
        response["data"] = serde_json::to_value(record).unwrap_or_default();
    }
    Ok(Json(response))
}
