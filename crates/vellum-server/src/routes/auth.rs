//! Login stub.
//!
//! Every seeded account shares one known password and a successful login
//! returns a fixed, non-expiring token. Placeholder until real credential
//! storage exists.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::info;
use vellum_shared::constants::{PLACEHOLDER_TOKEN, SEED_PASSWORD};
use vellum_shared::Role;

use crate::api::{parse_body, AppState};
use crate::error::ServerError;

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

#[derive(Debug, Default, Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginUser {
    id: String,
    email: String,
    role: Role,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: &'static str,
    user: LoginUser,
}

fn invalid_credentials() -> ServerError {
    ServerError::Unauthorized("Invalid email or password.".into())
}

fn password_matches(candidate: &str) -> bool {
    let candidate = candidate.as_bytes();
    let expected = SEED_PASSWORD.as_bytes();
    candidate.len() == expected.len() && candidate.ct_eq(expected).unwrap_u8() == 1
}

async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LoginResponse>, ServerError> {
    let req: LoginRequest = parse_body(&body)?;

    let email = req.email.unwrap_or_default().trim().to_lowercase();
    let password = req.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ServerError::BadRequest(
            "Email and password are required.".into(),
        ));
    }

    let record = state
        .with_db(move |db| db.find_login(&email))
        .await?
        .filter(|r| r.is_active)
        .ok_or_else(invalid_credentials)?;

    if !password_matches(&password) {
        return Err(invalid_credentials());
    }

    let role = match record.role {
        Some(Role::Admin) => Role::Admin,
        Some(Role::Designer) => Role::Designer,
        _ => Role::Reviewer,
    };

    info!(user_id = record.id, %role, "login succeeded");
    Ok(Json(LoginResponse {
        token: PLACEHOLDER_TOKEN,
        user: LoginUser {
            id: record.id.to_string(),
            email: record.email,
            role,
        },
    }))
}
