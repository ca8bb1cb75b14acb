//! Route handlers, one module per endpoint group. Each module exposes a
//! `router()` with paths relative to the API prefix.

pub mod admin;
pub mod assets;
pub mod auth;
pub mod user_roles;
pub mod users;
