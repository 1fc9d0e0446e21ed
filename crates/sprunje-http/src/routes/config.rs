use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// `GET /api/crud6/config` (§6.1): a trivial settings export.
pub async fn get_config(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "debug_mode": state.debug_mode }))
}
