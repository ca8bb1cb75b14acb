/// Application name
pub const APP_NAME: &str = "Vellum";

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "Vellum API";

/// Request header carrying the caller's role claim
pub const ROLE_HEADER: &str = "x-vellum-role";

/// Response header carrying server-side processing time
pub const SERVER_TIME_HEADER: &str = "x-server-time-ms";

/// Shared password of every seeded account. Placeholder until real hashing lands.
pub const SEED_PASSWORD: &str = "TestPass123!";

/// Stored in `users.password_hash` for every account
pub const PLACEHOLDER_PASSWORD_HASH: &str = "$2b$10$example_hash_replace_in_production";

/// Session token handed out by the login stub (non-expiring)
pub const PLACEHOLDER_TOKEN: &str = "mock-token";

/// Version label given to freshly created assets
pub const INITIAL_VERSION_LABEL: &str = "v1.0";

/// Row cap for each admin activity list
pub const ACTIVITY_LIMIT: u32 = 20;

/// Default HTTP API port
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Default path prefix for the REST API
pub const DEFAULT_API_PREFIX: &str = "/api";
