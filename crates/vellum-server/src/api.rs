use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{OriginalUri, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use vellum_shared::constants::{APP_NAME, SERVICE_NAME};
use vellum_store::Database;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::routes;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config: Arc::new(config),
        }
    }

    /// Run a store call on the blocking pool while holding the database lock.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut Database) -> vellum_store::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut guard = db
                .lock()
                .map_err(|e| ServerError::Internal(format!("Lock poisoned: {e}")))?;
            f(&mut guard).map_err(ServerError::from)
        })
        .await
        .map_err(|e| ServerError::Internal(format!("Blocking task failed: {e}")))?
    }
}

/// Parse a numeric path segment; `what` names the entity in the 400 message.
pub fn parse_id(raw: &str, what: &str) -> Result<i64, ServerError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ServerError::BadRequest(format!("Invalid {what} id")))
}

/// Decode a JSON request body. Handlers take the raw bytes so role checks run
/// before the payload is looked at; an empty body decodes as `T::default()`.
pub fn parse_body<T>(bytes: &Bytes) -> Result<T, ServerError>
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes).map_err(|e| {
        debug!(error = %e, "rejecting request body");
        ServerError::BadRequest("Invalid JSON body".into())
    })
}

/// Deserialize an optional user id sent either as a JSON number or as the
/// string form the API hands out (`"2"`). `null` and `""` mean no user.
pub fn optional_user_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct UserIdVisitor;

    impl<'de> de::Visitor<'de> for UserIdVisitor {
        type Value = Option<i64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a user id as a number or numeric string")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
        where
            D2: de::Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            i64::try_from(v)
                .map(Some)
                .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<i64>()
                .map(Some)
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_option(UserIdVisitor)
}

pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.cors_allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let api = Router::new()
        .merge(routes::assets::router())
        .merge(routes::users::router())
        .merge(routes::admin::router())
        .merge(routes::auth::router())
        .merge(routes::user_roles::router());

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest(&state.config.api_prefix, api)
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    let prefix = &state.config.api_prefix;
    Json(serde_json::json!({
        "message": format!("{APP_NAME} API Server"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "assets": format!("{prefix}/assets"),
            "users": format!("{prefix}/users"),
            "admin": format!("{prefix}/admin"),
            "auth": format!("{prefix}/auth/login"),
            "userRoles": format!("{prefix}/user-roles"),
        },
    }))
}

async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not Found",
            "message": format!("Route {method} {} not found", uri.path()),
        })),
    )
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{HeaderMap, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use vellum_store::Database;

    use super::{build_router, AppState};
    use crate::config::ServerConfig;

    pub fn app() -> Router {
        app_with(ServerConfig::default())
    }

    pub fn app_with(config: ServerConfig) -> Router {
        let db = Database::open_in_memory().unwrap();
        build_router(AppState::new(db, config))
    }

    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: serde_json::Value,
    }

    /// Send one request through the router. `role` sets `X-Vellum-Role`.
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        role: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(role) = role {
            builder = builder.header("x-vellum-role", role);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
