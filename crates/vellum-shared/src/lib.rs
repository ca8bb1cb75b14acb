//! # vellum-shared
//!
//! Vocabulary shared by the Vellum store and HTTP server: caller roles, asset
//! statuses, comment types and the handful of constants both sides agree on.

pub mod constants;
pub mod error;
pub mod types;

pub use error::ParseError;
pub use types::{version_label, AssetStatus, CommentType, Role};
