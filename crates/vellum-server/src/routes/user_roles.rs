//! Read-only view of the role lookup table.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::{parse_id, AppState};
use crate::error::ServerError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user-roles", get(list_roles))
        .route("/user-roles/:code", get(role_by_code))
        .route("/user-roles/id/:role_id", get(role_by_id))
}

fn role_not_found(what: String) -> ServerError {
    ServerError::NotFound(format!("No role found with {what}"))
}

async fn list_roles(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ServerError> {
    let roles = state.with_db(|db| db.list_roles()).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": roles.len(),
        "data": roles,
    })))
}

async fn role_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let lookup = code.clone();
    let role = state
        .with_db(move |db| db.role_by_code(&lookup))
        .await?
        .ok_or_else(|| role_not_found(format!("code: {code}")))?;
    Ok(Json(serde_json::json!({ "success": true, "data": role })))
}

async fn role_by_id(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let id = parse_id(&role_id, "role")?;
    let role = state
        .with_db(move |db| db.role_by_id(id))
        .await?
        .ok_or_else(|| role_not_found(format!("ID: {id}")))?;
    Ok(Json(serde_json::json!({ "success": true, "data": role })))
}
