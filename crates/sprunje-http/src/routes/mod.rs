pub mod actions;
pub mod config;
pub mod list;
pub mod query_params;
pub mod record;
pub mod relations;
pub mod schema;

use axum::routing::{get, put};
use axum::Router;

use crate::state::AppState;

/// Builds the full `/api/crud6` route tree (§6.1 HTTP surface table).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/crud6/config", get(config::get_config))
        .route("/api/crud6/{model}/schema", get(schema::get_schema))
        .route(
            "/api/crud6/{model}",
            get(list::list_records).post(list::create_record),
        )
        .route(
            "/api/crud6/{model}/{id}",
            get(record::read_record)
                .put(record::update_record)
                .delete(record::delete_record),
        )
        .route(
            "/api/crud6/{model}/{id}/{key}",
            put(record::patch_field).get(relations::list_related),
        )
        .route("/api/crud6/{model}/{id}/a/{action_key}", axum::routing::post(actions::custom_action))
        .with_state(state)
}
