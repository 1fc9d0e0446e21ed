use std::sync::Arc;

use sprunje_backend::{Principal, Record, RecordStore};
use sprunje_core::{DynamicValue, FieldType, ModelName, ModelSchema};
use sprunje_postgres::PostgresStore;

use crate::error::ApiError;
use crate::state::AppState;

/// Checks `principal` against `permission` (§4.6 common preamble).
///
/// No-auth-middleware-installed is treated as permitted rather than denied,
/// since wiring a `Principal` extractor is the authentication collaborator's
/// responsibility and out of scope for this core.
pub fn check_permission(principal: Option<&Principal>, permission: &str) -> Result<(), ApiError> {
    match principal {
        None => Ok(()),
        Some(p) if p.has_permission(permission) => Ok(()),
        Some(_) => Err(ApiError::Forbidden { permission: permission.to_string() }),
    }
}

/// Splits a `{model}` or `{model}@{connection}` route segment.
pub fn split_model_segment(segment: &str) -> (&str, Option<&str>) {
    match segment.split_once('@') {
        Some((model, connection)) => (model, Some(connection)),
        None => (segment, None),
    }
}

/// The resolved per-request model context (§4.3 Request Resolver): the
/// validated model name, its schema, and the store for its connection.
pub struct ModelContext {
    pub model: ModelName,
    pub connection: Option<String>,
    pub schema: Arc<ModelSchema>,
    pub store: Arc<PostgresStore>,
}

/// Validates `{model}@{connection}`, loads the schema, and resolves the
/// target store. Returns 400 for an invalid model name or unknown
/// connection, 404 if no schema file is registered for the model.
pub async fn resolve_model(state: &AppState, segment: &str) -> Result<ModelContext, ApiError> {
    let (model_str, connection) = split_model_segment(segment);
    let model = ModelName::new(model_str)?;
    let schema = state.schemas.get(model.as_str(), connection)?;
    let store = state.store_for(connection)?;
    Ok(ModelContext {
        model,
        connection: connection.map(str::to_string),
        schema,
        store,
    })
}

/// Coerces a path segment's primary-key text into the type the schema
/// declares for it, so an integer primary key is matched numerically.
pub fn parse_pk(schema: &ModelSchema, raw: &str) -> DynamicValue {
    match schema.field(&schema.primary_key).map(|f| &f.field_type) {
        Some(FieldType::Integer) => raw
            .parse::<i64>()
            .map(DynamicValue::Integer)
            .unwrap_or_else(|_| DynamicValue::Text(raw.to_string())),
        _ => DynamicValue::Text(raw.to_string()),
    }
}

/// Looks up the record named by `pk_raw` within `ctx`, per the resolved
/// primary-key type. 404s via `BackendError::RecordNotFound` (§4.3).
pub async fn resolve_record(ctx: &ModelContext, pk_raw: &str) -> Result<Record, ApiError> {
    let pk = parse_pk(&ctx.schema, pk_raw);
    Ok(ctx.store.find(&ctx.schema, &pk).await?)
}
