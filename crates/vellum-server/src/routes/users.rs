//! Account management. Every route here is admin only.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use vellum_shared::Role;
use vellum_store::{NewAccount, UserAccount};

use crate::api::{parse_body, parse_id, AppState};
use crate::error::ServerError;
use crate::role_gate::admin_only;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:user_id",
            get(get_user)
                .put(replace_role)
                .patch(update_user)
                .delete(deactivate_user),
        )
        .route_layer(middleware::from_fn(admin_only))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    email: Option<String>,
    role: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RoleRequest {
    role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UpdateUserRequest {
    role: Option<String>,
    is_active: Option<bool>,
}

fn parse_role(raw: &str) -> Result<Role, ServerError> {
    Role::parse(raw).map_err(|_| ServerError::BadRequest("Invalid role".into()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn found(user: Option<UserAccount>) -> Result<Json<UserAccount>, ServerError> {
    user.map(Json)
        .ok_or_else(|| ServerError::NotFound("User not found".into()))
}

async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ServerError> {
    let users = state.with_db(|db| db.list_users()).await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserAccount>, ServerError> {
    let id = parse_id(&user_id, "user")?;
    found(state.with_db(move |db| db.get_user(id)).await?)
}

/// Create an account, or update and reactivate the one with the same email.
async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
    let req: CreateUserRequest = parse_body(&body)?;

    let email = non_blank(req.email)
        .ok_or_else(|| ServerError::BadRequest("email is required".into()))?;
    let role = non_blank(req.role)
        .ok_or_else(|| ServerError::BadRequest("role is required".into()))?;
    let new = NewAccount {
        email: email.trim().to_string(),
        role: parse_role(&role)?,
        display_name: req.display_name,
    };

    let user = state.with_db(move |db| db.create_account(&new)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn replace_role(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Json<UserAccount>, ServerError> {
    let id = parse_id(&user_id, "user")?;
    let req: RoleRequest = parse_body(&body)?;

    let role = non_blank(req.role)
        .ok_or_else(|| ServerError::BadRequest("role is required".into()))?;
    let role = parse_role(&role)?;

    found(state.with_db(move |db| db.update_user_role(id, role)).await?)
}

/// Partial update of `is_active` and/or `role`, applied together.
async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Json<UserAccount>, ServerError> {
    let id = parse_id(&user_id, "user")?;
    let req: UpdateUserRequest = parse_body(&body)?;

    let role = non_blank(req.role).map(|r| parse_role(&r)).transpose()?;
    let is_active = req.is_active;
    if role.is_none() && is_active.is_none() {
        return Err(ServerError::BadRequest(
            "Provide role and/or is_active".into(),
        ));
    }

    found(state.with_db(move |db| db.update_user(id, is_active, role)).await?)
}

/// Soft delete: the account stays, flagged inactive.
async fn deactivate_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserAccount>, ServerError> {
    let id = parse_id(&user_id, "user")?;
    found(state.with_db(move |db| db.deactivate_user(id)).await?)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::{app, send};

    #[tokio::test]
    async fn non_admins_are_turned_away() {
        let app = app();
        for role in [None, Some("designer"), Some("reviewer")] {
            let res = send(&app, "GET", "/api/users", role, None).await;
            assert_eq!(res.status, StatusCode::FORBIDDEN);
        }
        let res = send(&app, "DELETE", "/api/users/1", Some("reviewer"), None).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_lists_seeded_accounts() {
        let app = app();
        let res = send(&app, "GET", "/api/users", Some("admin"), None).await;
        assert_eq!(res.status, StatusCode::OK);
        let users = res.body.as_array().unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(users[0]["id"], "1");
        assert_eq!(users[0]["role"], "admin");
        assert_eq!(users[0]["isActive"], true);
    }

    #[tokio::test]
    async fn create_validates_and_upserts() {
        let app = app();

        let res = send(&app, "POST", "/api/users", Some("admin"), Some(json!({ "role": "designer" }))).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "email is required");

        let res = send(
            &app,
            "POST",
            "/api/users",
            Some("admin"),
            Some(json!({ "email": "new@vellum.test", "role": "owner" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "Invalid role");

        let res = send(
            &app,
            "POST",
            "/api/users",
            Some("admin"),
            Some(json!({ "email": " new@vellum.test ", "role": "Designer", "displayName": "Nia" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["email"], "new@vellum.test");
        assert_eq!(res.body["role"], "designer");
        let id = res.body["id"].clone();

        let res = send(
            &app,
            "POST",
            "/api/users",
            Some("admin"),
            Some(json!({ "email": "NEW@vellum.test", "role": "reviewer" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["id"], id);
        assert_eq!(res.body["role"], "reviewer");
        assert_eq!(res.body["displayName"], "Nia");
    }

    #[tokio::test]
    async fn patch_applies_flag_then_role() {
        let app = app();

        let res = send(&app, "PATCH", "/api/users/3", Some("admin"), Some(json!({}))).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);

        let res = send(
            &app,
            "PATCH",
            "/api/users/3",
            Some("admin"),
            Some(json!({ "is_active": false, "role": "admin" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["isActive"], false);
        assert_eq!(res.body["role"], "admin");

        let res = send(
            &app,
            "PATCH",
            "/api/users/3",
            Some("admin"),
            Some(json!({ "is_active": true })),
        )
        .await;
        assert_eq!(res.body["isActive"], true);
        assert_eq!(res.body["role"], "admin");

        let res = send(
            &app,
            "PATCH",
            "/api/users/9999",
            Some("admin"),
            Some(json!({ "is_active": true })),
        )
        .await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_replaces_role() {
        let app = app();
        let res = send(&app, "PUT", "/api/users/2", Some("admin"), Some(json!({ "role": "reviewer" }))).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["role"], "reviewer");

        let res = send(&app, "PUT", "/api/users/2", Some("admin"), Some(json!({}))).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "role is required");
    }

    #[tokio::test]
    async fn delete_is_soft() {
        let app = app();
        let res = send(&app, "DELETE", "/api/users/2", Some("admin"), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["isActive"], false);

        let res = send(&app, "GET", "/api/users/2", Some("admin"), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["email"], "designer@vellum.test");

        let res = send(&app, "DELETE", "/api/users/abc", Some("admin"), None).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "Invalid user id");
    }
}
