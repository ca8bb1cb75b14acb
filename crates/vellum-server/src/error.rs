use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use vellum_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// A role was claimed but is not on the route's allow-list.
    #[error("Forbidden: {0}")]
    RoleNotAllowed(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServerError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServerError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            ServerError::RoleNotAllowed(_) => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Internal(_) => internal(),
            ServerError::Store(StoreError::InvalidStatus(_)) => {
                (StatusCode::BAD_REQUEST, "Invalid status".to_string())
            }
            ServerError::Store(StoreError::UnknownCommentType(_)) => {
                (StatusCode::BAD_REQUEST, "Unknown comment type".to_string())
            }
            ServerError::Store(e) if e.is_constraint_violation() => (
                StatusCode::BAD_REQUEST,
                "Referenced user does not exist".to_string(),
            ),
            ServerError::Store(_) => internal(),
        }
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %message, "request rejected");
        }

        let mut body = serde_json::json!({
            "error": message,
        });
        if let ServerError::RoleNotAllowed(detail) = &self {
            body["message"] = serde_json::Value::from(detail.as_str());
        }

        (status, axum::Json(body)).into_response()
    }
}
