use axum::extract::{Extension, Path, RawQuery, State};
use axum::Json;
use sprunje_backend::Principal;
use sprunje_core::{filter_for_context, StandardAction};

use crate::error::ApiError;
use crate::middleware::{check_permission, resolve_model};
use crate::routes::query_params::{extract_context_param, parse_query_pairs};
use crate::state::AppState;

/// `GET /api/crud6/{model}/schema?context=...` (§4.6.3).
pub async fn get_schema(
    State(state): State<AppState>,
    Path(model_segment): Path<String>,
    principal: Option<Extension<Principal>>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ctx = resolve_model(&state, &model_segment).await?;
    check_permission(
        principal.as_ref().map(|Extension(p)| p),
        &ctx.schema.permission_for(StandardAction::Read),
    )?;

    let pairs = parse_query_pairs(raw_query.as_deref());
    let contexts = extract_context_param(&pairs);
    let filtered = filter_for_context(&ctx.schema, &contexts);

    Ok(Json(serde_json::json!({
        "message": "Schema retrieved successfully.",
        "model": ctx.model.as_str(),
        "modelDisplayName": ctx.schema.title,
        "schema": filtered,
        "breadcrumb": {
            "modelTitle": ctx.schema.title,
            "singularTitle": ctx.schema.singular_title,
        },
    })))
}
