use std::collections::BTreeMap;

use axum::extract::{Extension, Path, RawQuery, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use sprunje_backend::{Principal, Record, RecordStore};
use sprunje_core::{
    parse_raw_params, resolve_sprunje_params, DynamicValue, SprunjePage, StandardAction,
    ValidationOutcome,
};

use crate::error::ApiError;
use crate::middleware::{check_permission, resolve_model};
use crate::routes::query_params::parse_query_pairs;
use crate::state::AppState;

/// `GET /api/crud6/{model}` (§4.6.1).
pub async fn list_records(
    State(state): State<AppState>,
    Path(model_segment): Path<String>,
    principal: Option<Extension<Principal>>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<SprunjePage<Record>>, ApiError> {
    let ctx = resolve_model(&state, &model_segment).await?;
    check_permission(
        principal.as_ref().map(|Extension(p)| p),
        &ctx.schema.permission_for(StandardAction::Read),
    )?;

    let pairs = parse_query_pairs(raw_query.as_deref());
    let raw = parse_raw_params(&pairs, state.default_page_size, state.max_page_size);
    let resolved = resolve_sprunje_params(&ctx.schema, raw);
    let page = ctx.store.list(&ctx.schema, &resolved).await?;
    Ok(Json(page))
}

/// `POST /api/crud6/{model}` (§4.6.4).
pub async fn create_record(
    State(state): State<AppState>,
    Path(model_segment): Path<String>,
    principal: Option<Extension<Principal>>,
    Json(body): Json<BTreeMap<String, DynamicValue>>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let ctx = resolve_model(&state, &model_segment).await?;
    check_permission(
        principal.as_ref().map(|Extension(p)| p),
        &ctx.schema.permission_for(StandardAction::Create),
    )?;

    let fields = match sprunje_core::validate_and_transform(&ctx.schema, &body, true) {
        ValidationOutcome::Invalid(errors) => return Err(ApiError::Validation { errors }),
        ValidationOutcome::Valid(fields) => fields,
    };

    let mut fields = fields;
    if ctx.schema.timestamps {
        let now = DynamicValue::Text(Utc::now().to_rfc3339());
        fields.insert("created_at".to_string(), now.clone());
        fields.insert("updated_at".to_string(), now);
    }

    let record = ctx.store.insert(&ctx.schema, fields).await?;
    let id = record.pk(&ctx.schema.primary_key).cloned().unwrap_or(DynamicValue::Null);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "title": "Created",
            "description": format!("{} created successfully.", ctx.schema.singular_title),
            "model": ctx.model.as_str(),
            "id": id,
            "data": record,
        })),
    ))
}
