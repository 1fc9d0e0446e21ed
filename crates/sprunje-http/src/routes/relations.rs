use axum::extract::{Extension, Path, RawQuery, State};
use axum::Json;
use sprunje_backend::{Principal, Record, RecordStore};
use sprunje_core::{parse_raw_params, resolve_sprunje_params, RelationResolution, SprunjePage, StandardAction};

use crate::error::ApiError;
use crate::middleware::{check_permission, resolve_model, resolve_record};
use crate::routes::query_params::parse_query_pairs;
use crate::state::AppState;

/// `GET /api/crud6/{model}/{id}/{relation}` (§4.7).
pub async fn list_related(
    State(state): State<AppState>,
    Path((model_segment, pk_raw, relation)): Path<(String, String, String)>,
    principal: Option<Extension<Principal>>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<SprunjePage<Record>>, ApiError> {
    let ctx = resolve_model(&state, &model_segment).await?;
    check_permission(
        principal.as_ref().map(|Extension(p)| p),
        &ctx.schema.permission_for(StandardAction::Read),
    )?;
    resolve_record(&ctx, &pk_raw).await?;
    let pk = crate::middleware::parse_pk(&ctx.schema, &pk_raw);

    let related_model = match ctx.schema.resolve_relation(&relation) {
        Some(RelationResolution::Relationship(rel)) => rel.related_model.clone(),
        Some(RelationResolution::Detail(detail)) => detail.model.clone(),
        None => {
            return Err(ApiError::NotFound {
                message: format!("model '{}' has no relation named '{relation}'", ctx.model.as_str()),
            })
        }
    };
    let related_schema = state.schemas.get(&related_model, ctx.connection.as_deref())?;

    let pairs = parse_query_pairs(raw_query.as_deref());
    let raw = parse_raw_params(&pairs, state.default_page_size, state.max_page_size);
    let resolved = resolve_sprunje_params(&related_schema, raw);

    let page = ctx
        .store
        .list_related(&ctx.schema, &pk, &relation, &related_schema, &resolved)
        .await?;
    Ok(Json(page))
}
