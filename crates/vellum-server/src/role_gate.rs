//! Role gate.
//!
//! The caller's role travels in the `X-Vellum-Role` header. It is a
//! capability claim set by the client after login and is not verified against
//! any session: the trust boundary is the network edge.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use vellum_shared::constants::ROLE_HEADER;
use vellum_shared::Role;

use crate::error::ServerError;

/// The role claimed by the caller, or `None` when the header is missing or
/// not one of the known roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerRole(pub Option<Role>);

impl CallerRole {
    pub fn from_header(value: Option<&str>) -> Self {
        Self(value.and_then(|raw| Role::parse(raw).ok()))
    }

    /// Check the claimed role against an allow-list.
    pub fn require(self, allowed: &[Role]) -> Result<Role, ServerError> {
        let Some(role) = self.0 else {
            return Err(ServerError::Forbidden(
                "Role required; send X-Vellum-Role header".into(),
            ));
        };
        if !allowed.contains(&role) {
            let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
            return Err(ServerError::RoleNotAllowed(format!(
                "This action requires one of: {}",
                names.join(", ")
            )));
        }
        Ok(role)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerRole
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok());
        Ok(Self::from_header(raw))
    }
}

/// Middleware guarding whole routers that only admins may use.
pub async fn admin_only(
    caller: CallerRole,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    caller.require(&[Role::Admin])?;
    Ok(next.run(request).await)
}
