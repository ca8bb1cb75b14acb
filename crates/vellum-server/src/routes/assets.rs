//! Asset review workflow routes.
//!
//! Uploading an asset or a new version requires designer or admin; changing
//! status requires reviewer or admin; owner changes and deletes are admin
//! only. Reads and commenting are open.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use vellum_shared::constants::SERVER_TIME_HEADER;
use vellum_shared::Role;
use vellum_store::{NewAsset, NewComment, NewVersion};

use crate::api::{optional_user_id, parse_body, parse_id, AppState};
use crate::error::ServerError;
use crate::role_gate::CallerRole;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/assets", get(list_assets).post(create_asset))
        .route("/assets/summary", get(asset_summary))
        .route("/assets/:asset_id", get(get_asset).delete(delete_asset))
        .route("/assets/:asset_id/owner", patch(set_owner))
        .route("/assets/:asset_id/status", patch(update_status))
        .route(
            "/assets/:asset_id/versions",
            get(list_versions).post(create_version),
        )
        .route(
            "/assets/:asset_id/comments",
            get(list_comments).post(add_comment),
        )
        .route(
            "/assets/:asset_id/comments/:comment_id",
            delete(delete_comment),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAssetRequest {
    title: Option<String>,
    description: Option<String>,
    #[serde(default, deserialize_with = "optional_user_id")]
    created_by_user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnerRequest {
    #[serde(default, deserialize_with = "optional_user_id")]
    owner_user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct StatusRequest {
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateVersionRequest {
    label: Option<String>,
    notes: Option<String>,
    #[serde(default, deserialize_with = "optional_user_id")]
    created_by_user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentRequest {
    message: Option<String>,
    comment_type: Option<String>,
    #[serde(default, deserialize_with = "optional_user_id")]
    author_user_id: Option<i64>,
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn asset_not_found() -> ServerError {
    ServerError::NotFound("Asset not found".into())
}

async fn list_assets(State(state): State<AppState>) -> Result<impl IntoResponse, ServerError> {
    let started = Instant::now();
    let assets = state.with_db(|db| db.list_assets()).await?;
    let server_time = elapsed_ms(started).to_string();
    Ok(([(SERVER_TIME_HEADER, server_time)], Json(assets)))
}

async fn asset_summary(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let started = Instant::now();
    let summary = state.with_db(|db| db.status_summary()).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "summary": summary.summary,
        "total": summary.total,
        "server_time_ms": elapsed_ms(started),
    })))
}

async fn create_asset(
    State(state): State<AppState>,
    caller: CallerRole,
    body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
    caller.require(&[Role::Designer, Role::Admin])?;
    let req: CreateAssetRequest = parse_body(&body)?;

    let title = req
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("title is required".into()))?;
    let new = NewAsset {
        title,
        description: req.description,
        created_by_user_id: req.created_by_user_id,
    };

    let asset = state.with_db(move |db| db.create_asset(&new)).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

async fn get_asset(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let id = parse_id(&asset_id, "asset")?;
    let asset = state
        .with_db(move |db| db.get_asset(id))
        .await?
        .ok_or_else(asset_not_found)?;
    Ok(Json(asset))
}

async fn delete_asset(
    State(state): State<AppState>,
    caller: CallerRole,
    Path(asset_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    caller.require(&[Role::Admin])?;
    let id = parse_id(&asset_id, "asset")?;

    if !state.with_db(move |db| db.delete_asset(id)).await? {
        return Err(asset_not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn set_owner(
    State(state): State<AppState>,
    caller: CallerRole,
    Path(asset_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
    caller.require(&[Role::Admin])?;
    let id = parse_id(&asset_id, "asset")?;
    let req: OwnerRequest = parse_body(&body)?;

    let asset = state
        .with_db(move |db| db.set_asset_owner(id, req.owner_user_id))
        .await?
        .ok_or_else(asset_not_found)?;
    Ok(Json(asset))
}

async fn update_status(
    State(state): State<AppState>,
    caller: CallerRole,
    Path(asset_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
    let role = caller.require(&[Role::Reviewer, Role::Admin])?;
    let id = parse_id(&asset_id, "asset")?;
    let req: StatusRequest = parse_body(&body)?;

    let status = req
        .status
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServerError::BadRequest("status is required".into()))?;

    let updated = state
        .with_db(move |db| db.update_asset_status(id, &status))
        .await?
        .ok_or_else(asset_not_found)?;

    info!(asset_id = id, status = %updated.status, %role, "asset status updated");
    Ok(Json(updated))
}

async fn list_versions(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let id = parse_id(&asset_id, "asset")?;
    let versions = state.with_db(move |db| db.list_versions(id)).await?;
    Ok(Json(versions))
}

async fn create_version(
    State(state): State<AppState>,
    caller: CallerRole,
    Path(asset_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
    caller.require(&[Role::Designer, Role::Admin])?;
    let id = parse_id(&asset_id, "asset")?;
    let req: CreateVersionRequest = parse_body(&body)?;

    let new = NewVersion {
        label: req.label,
        notes: req.notes,
        created_by_user_id: req.created_by_user_id,
    };
    let version = state
        .with_db(move |db| db.create_version(id, &new))
        .await?
        .ok_or_else(asset_not_found)?;
    Ok((StatusCode::CREATED, Json(version)))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let id = parse_id(&asset_id, "asset")?;
    let comments = state.with_db(move |db| db.list_comments(id)).await?;
    Ok(Json(comments))
}

async fn add_comment(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
    let id = parse_id(&asset_id, "asset")?;
    let req: CreateCommentRequest = parse_body(&body)?;

    let message = req
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("message is required".into()))?;
    let new = NewComment {
        message,
        comment_type: req.comment_type,
        author_user_id: req.author_user_id,
    };
    let policy = state.config.comment_type_policy;

    let comment = state
        .with_db(move |db| db.add_comment(id, &new, policy))
        .await?
        .ok_or_else(asset_not_found)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn delete_comment(
    State(state): State<AppState>,
    caller: CallerRole,
    Path((asset_id, comment_id)): Path<(String, String)>,
) -> Result<StatusCode, ServerError> {
    caller.require(&[Role::Admin])?;
    parse_id(&asset_id, "asset")?;
    let comment_id = parse_id(&comment_id, "comment")?;

    if !state.with_db(move |db| db.delete_comment(comment_id)).await? {
        return Err(ServerError::NotFound("Comment not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::{app, app_with, send};
    use crate::config::ServerConfig;
    use vellum_store::CommentTypePolicy;

    async fn create(app: &axum::Router, title: &str) -> i64 {
        let res = send(
            app,
            "POST",
            "/api/assets",
            Some("designer"),
            Some(json!({ "title": title })),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
        res.body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn designer_creates_draft_and_summary_counts_it() {
        let app = app();
        let res = send(
            &app,
            "POST",
            "/api/assets",
            Some("designer"),
            Some(json!({ "title": "Banner" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["status"], "Draft");
        assert_eq!(res.body["current_version"], "v1.0");
        assert_eq!(res.body["owner"], "Unassigned");

        let res = send(&app, "GET", "/api/assets/summary", None, None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["summary"]["Draft"], 1);
        assert_eq!(res.body["total"], 1);
        assert!(res.body["server_time_ms"].is_u64());
    }

    #[tokio::test]
    async fn create_requires_title_and_role() {
        let app = app();
        let res = send(&app, "POST", "/api/assets", Some("designer"), Some(json!({}))).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "title is required");

        let res = send(
            &app,
            "POST",
            "/api/assets",
            Some("reviewer"),
            Some(json!({ "title": "Banner" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert_eq!(res.body["error"], "Forbidden");
        assert_eq!(res.body["message"], "This action requires one of: designer, admin");

        let res = send(&app, "POST", "/api/assets", None, Some(json!({ "title": "x" }))).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert_eq!(res.body["error"], "Role required; send X-Vellum-Role header");
    }

    #[tokio::test]
    async fn logged_in_user_id_is_accepted_as_creator() {
        let app = app();
        let res = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "designer@vellum.test", "password": "TestPass123!" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        let user_id = res.body["user"]["id"].clone();
        assert_eq!(user_id, json!("2"));

        let res = send(
            &app,
            "POST",
            "/api/assets",
            Some("designer"),
            Some(json!({ "title": "Banner", "createdByUserId": user_id })),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["owner"], "Designer User");
        let id = res.body["id"].as_i64().unwrap();

        let res = send(
            &app,
            "POST",
            &format!("/api/assets/{id}/versions"),
            Some("designer"),
            Some(json!({ "createdByUserId": "2" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);

        let res = send(
            &app,
            "POST",
            &format!("/api/assets/{id}/comments"),
            None,
            Some(json!({ "message": "Nice", "authorUserId": "3" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["author"], "Reviewer User");

        let res = send(
            &app,
            "PATCH",
            &format!("/api/assets/{id}/owner"),
            Some("admin"),
            Some(json!({ "ownerUserId": "" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["owner"], "Unassigned");
    }

    #[tokio::test]
    async fn non_numeric_user_id_is_a_plain_400() {
        let app = app();
        let res = send(
            &app,
            "POST",
            "/api/assets",
            Some("designer"),
            Some(json!({ "title": "Banner", "createdByUserId": "two" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "Invalid JSON body");
    }

    #[tokio::test]
    async fn list_sets_server_time_header() {
        let app = app();
        create(&app, "One").await;
        create(&app, "Two").await;

        let res = send(&app, "GET", "/api/assets", None, None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.headers.contains_key("x-server-time-ms"));
        let titles: Vec<_> = res.body.as_array().unwrap().iter().map(|a| a["title"].clone()).collect();
        assert_eq!(titles, vec![json!("Two"), json!("One")]);
    }

    #[tokio::test]
    async fn get_missing_and_malformed_ids() {
        let app = app();
        let res = send(&app, "GET", "/api/assets/9999", None, None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body["error"], "Asset not found");

        let res = send(&app, "GET", "/api/assets/abc", None, None).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "Invalid asset id");
    }

    #[tokio::test]
    async fn reviewer_approves_asset() {
        let app = app();
        let id = create(&app, "Poster").await;

        let res = send(
            &app,
            "PATCH",
            &format!("/api/assets/{id}/status"),
            Some("reviewer"),
            Some(json!({ "status": "Approved" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["status"], "Approved");
        assert!(res.body["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn designer_cannot_change_status_whatever_the_payload() {
        let app = app();
        let id = create(&app, "Poster").await;
        let uri = format!("/api/assets/{id}/status");

        for body in [json!({ "status": "Approved" }), json!({}), json!("garbage")] {
            let res = send(&app, "PATCH", &uri, Some("designer"), Some(body)).await;
            assert_eq!(res.status, StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn invalid_status_is_400_even_for_missing_asset() {
        let app = app();
        let id = create(&app, "Poster").await;

        for target in [id, 9_999] {
            let res = send(
                &app,
                "PATCH",
                &format!("/api/assets/{target}/status"),
                Some("admin"),
                Some(json!({ "status": "NOT_A_REAL_STATUS" })),
            )
            .await;
            assert_eq!(res.status, StatusCode::BAD_REQUEST);
            assert_eq!(res.body["error"], "Invalid status");
        }

        let res = send(
            &app,
            "PATCH",
            "/api/assets/9999/status",
            Some("admin"),
            Some(json!({ "status": "Approved" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn new_version_sends_asset_back_to_review() {
        let app = app();
        let id = create(&app, "Poster").await;

        let res = send(
            &app,
            "POST",
            &format!("/api/assets/{id}/versions"),
            Some("designer"),
            Some(json!({ "notes": "Tweaked colors" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["version_number"], 2);

        let res = send(&app, "GET", &format!("/api/assets/{id}"), None, None).await;
        assert_eq!(res.body["status"], "In Review");
        assert_eq!(res.body["current_version"], "v2.0");

        let res = send(&app, "GET", &format!("/api/assets/{id}/versions"), None, None).await;
        assert_eq!(res.body.as_array().unwrap().len(), 2);

        let res = send(
            &app,
            "POST",
            "/api/assets/9999/versions",
            Some("admin"),
            Some(json!({})),
        )
        .await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn comments_lifecycle() {
        let app = app();
        let id = create(&app, "Poster").await;
        let uri = format!("/api/assets/{id}/comments");

        let res = send(&app, "POST", &uri, None, Some(json!({ "message": "" }))).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);

        let res = send(
            &app,
            "POST",
            &uri,
            None,
            Some(json!({ "message": "Needs work", "commentType": "Changes Requested" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["author"], "Unknown");
        let comment_id = res.body["id"].as_i64().unwrap();

        let res = send(&app, "GET", &uri, None, None).await;
        assert_eq!(res.body.as_array().unwrap().len(), 1);

        let delete_uri = format!("{uri}/{comment_id}");
        let res = send(&app, "DELETE", &delete_uri, Some("reviewer"), None).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);

        let res = send(&app, "DELETE", &delete_uri, Some("admin"), None).await;
        assert_eq!(res.status, StatusCode::NO_CONTENT);

        let res = send(&app, "DELETE", &delete_uri, Some("admin"), None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);

        let res = send(&app, "DELETE", &format!("{uri}/xyz"), Some("admin"), None).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "Invalid comment id");
    }

    #[tokio::test]
    async fn unknown_comment_type_follows_policy() {
        let body = json!({ "message": "Hmm", "commentType": "Rant" });

        let strict = app();
        let id = create(&strict, "Poster").await;
        let res = send(&strict, "POST", &format!("/api/assets/{id}/comments"), None, Some(body.clone())).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "Unknown comment type");

        let lenient = app_with(ServerConfig {
            comment_type_policy: CommentTypePolicy::FallbackToGeneral,
            ..ServerConfig::default()
        });
        let id = create(&lenient, "Poster").await;
        let res = send(&lenient, "POST", &format!("/api/assets/{id}/comments"), None, Some(body)).await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["comment_type"], "General");
    }

    #[tokio::test]
    async fn admin_reassigns_owner_and_deletes() {
        let app = app();
        let id = create(&app, "Poster").await;
        let uri = format!("/api/assets/{id}");

        let res = send(
            &app,
            "PATCH",
            &format!("{uri}/owner"),
            Some("admin"),
            Some(json!({ "ownerUserId": 2 })),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["owner"], "Designer User");

        let res = send(
            &app,
            "PATCH",
            &format!("{uri}/owner"),
            Some("admin"),
            Some(json!({ "ownerUserId": 9999 })),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);

        let res = send(&app, "DELETE", &uri, Some("designer"), None).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);

        let res = send(&app, "DELETE", &uri, Some("admin"), None).await;
        assert_eq!(res.status, StatusCode::NO_CONTENT);

        let res = send(&app, "GET", &uri, None, None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);

        let res = send(&app, "DELETE", &uri, Some("admin"), None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }
}
