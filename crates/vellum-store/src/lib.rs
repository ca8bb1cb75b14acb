//! # vellum-store
//!
//! Relational storage for the Vellum review workflow, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed operations for assets, their
//! versions and comments, user accounts, role lookups and the admin rollups.
//! Every multi-statement write runs inside a single immediate transaction.

pub mod admin;
pub mod assets;
pub mod comments;
pub mod database;
pub mod lookups;
pub mod migrations;
pub mod models;
pub mod users;
pub mod versions;

mod error;

pub use comments::CommentTypePolicy;
pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
