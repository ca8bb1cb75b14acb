use axum::{extract::State, middleware, routing::get, Json, Router};
use vellum_shared::constants::ACTIVITY_LIMIT;
use vellum_store::{AdminActivity, AdminOverview};

use crate::api::AppState;
use crate::error::ServerError;
use crate::role_gate::admin_only;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/overview", get(overview))
        .route("/admin/activity", get(activity))
        .route_layer(middleware::from_fn(admin_only))
}

async fn overview(State(state): State<AppState>) -> Result<Json<AdminOverview>, ServerError> {
    let overview = state.with_db(|db| db.admin_overview()).await?;
    Ok(Json(overview))
}

/// Recent assets and recent comments, read independently. The two lists may
/// reflect slightly different moments.
async fn activity(State(state): State<AppState>) -> Result<Json<AdminActivity>, ServerError> {
    let (recent_assets, recent_comments) = tokio::try_join!(
        state.with_db(|db| db.recent_assets(ACTIVITY_LIMIT)),
        state.with_db(|db| db.recent_comments(ACTIVITY_LIMIT)),
    )?;

    Ok(Json(AdminActivity {
        recent_assets,
        recent_comments,
    }))
}
