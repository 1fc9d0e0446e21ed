use std::collections::BTreeMap;

use axum::extract::{Extension, Path, State};
use axum::Json;
use chrono::Utc;
use sprunje_backend::{Principal, RecordStore};
use sprunje_core::{DynamicValue, StandardAction, ValidationOutcome};

use crate::error::ApiError;
use crate::middleware::{check_permission, resolve_model, resolve_record};
use crate::state::AppState;

/// `GET /api/crud6/{model}/{id}` (§4.6.2).
pub async fn read_record(
    State(state): State<AppState>,
    Path((model_segment, pk_raw)): Path<(String, String)>,
    principal: Option<Extension<Principal>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ctx = resolve_model(&state, &model_segment).await?;
    check_permission(
        principal.as_ref().map(|Extension(p)| p),
        &ctx.schema.permission_for(StandardAction::Read),
    )?;
    let record = resolve_record(&ctx, &pk_raw).await?;
    let id = record.pk(&ctx.schema.primary_key).cloned().unwrap_or(DynamicValue::Null);

    let breadcrumb = ctx
        .schema
        .title_field
        .as_deref()
        .and_then(|field| record.field(field))
        .map(|title| format!("{title} ({id})"))
        .unwrap_or_else(|| id.to_string());

    Ok(Json(serde_json::json!({
        "message": "Record retrieved successfully.",
        "model": ctx.model.as_str(),
        "modelDisplayName": ctx.schema.title,
        "id": id,
        "data": record,
        "breadcrumb": breadcrumb,
    })))
}

/// `PUT /api/crud6/{model}/{id}` (§4.6.5).
pub async fn update_record(
    State(state): State<AppState>,
    Path((model_segment, pk_raw)): Path<(String, String)>,
    principal: Option<Extension<Principal>>,
    Json(body): Json<BTreeMap<String, DynamicValue>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ctx = resolve_model(&state, &model_segment).await?;
    check_permission(
        principal.as_ref().map(|Extension(p)| p),
        &ctx.schema.permission_for(StandardAction::Update),
    )?;
    let pk = crate::middleware::parse_pk(&ctx.schema, &pk_raw);
    resolve_record(&ctx, &pk_raw).await?;

    let mut fields = match sprunje_core::validate_and_transform(&ctx.schema, &body, false) {
        ValidationOutcome::Invalid(errors) => return Err(ApiError::Validation { errors }),
        ValidationOutcome::Valid(fields) => fields,
    };
    if ctx.schema.timestamps {
        fields.insert("updated_at".to_string(), DynamicValue::Text(Utc::now().to_rfc3339()));
    }

    ctx.store.update(&ctx.schema, &pk, fields).await?;

    Ok(Json(serde_json::json!({
        "title": "Updated",
        "description": format!("{} updated successfully.", ctx.schema.singular_title),
        "model": ctx.model.as_str(),
        "id": pk,
    })))
}

/// `DELETE /api/crud6/{model}/{id}` (§4.6.7).
pub async fn delete_record(
    State(state): State<AppState>,
    Path((model_segment, pk_raw)): Path<(String, String)>,
    principal: Option<Extension<Principal>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ctx = resolve_model(&state, &model_segment).await?;
    check_permission(
        principal.as_ref().map(|Extension(p)| p),
        &ctx.schema.permission_for(StandardAction::Delete),
    )?;
    let pk = crate::middleware::parse_pk(&ctx.schema, &pk_raw);
    resolve_record(&ctx, &pk_raw).await?;

    if ctx.schema.soft_delete {
        ctx.store.soft_delete(&ctx.schema, &pk).await?;
    } else {
        ctx.store.delete(&ctx.schema, &pk).await?;
    }

    Ok(Json(serde_json::json!({
        "title": "Deleted",
        "description": format!("{} deleted successfully.", ctx.schema.singular_title),
    })))
}

/// `PUT /api/crud6/{model}/{id}/{field}` (§4.6.6).
pub async fn patch_field(
    State(state): State<AppState>,
    Path((model_segment, pk_raw, field_name)): Path<(String, String, String)>,
    principal: Option<Extension<Principal>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ctx = resolve_model(&state, &model_segment).await?;
    check_permission(
        principal.as_ref().map(|Extension(p)| p),
        &ctx.schema.permission_for(StandardAction::UpdateField),
    )?;

    let field = ctx.schema.field(&field_name).ok_or_else(|| ApiError::NotFound {
        message: format!("field '{field_name}' on model '{}'", ctx.model.as_str()),
    })?;
    if !field.is_editable() {
        return Err(ApiError::Readonly { field: field_name.clone() });
    }

    let pk = crate::middleware::parse_pk(&ctx.schema, &pk_raw);
    resolve_record(&ctx, &pk_raw).await?;

    let raw_value = body.get("value").cloned().unwrap_or(body);
    let mut input = BTreeMap::new();
    input.insert(field_name.clone(), DynamicValue::from_json(raw_value));

    let fields = match sprunje_core::validate_and_transform(&ctx.schema, &input, false) {
        ValidationOutcome::Invalid(errors) => return Err(ApiError::Validation { errors }),
        ValidationOutcome::Valid(fields) => fields,
    };

    let record = ctx.store.update(&ctx.schema, &pk, fields).await?;

    Ok(Json(serde_json::json!({
        "title": "Updated",
        "description": format!("{} updated successfully.", field.label.as_deref().unwrap_or(&field_name)),
        "model": ctx.model.as_str(),
        "id": pk,
        "data": record,
    })))
}
