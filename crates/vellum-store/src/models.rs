//! Domain model structs read from and written to the review database.
//!
//! Read models are display-ready: lookup ids are already resolved to their
//! names and user references to display names. Their serde shape is the JSON
//! shape served by the HTTP API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use vellum_shared::Role;

fn id_as_string<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(id)
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// A reviewable asset with its status and owner resolved for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Asset {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Status name from `asset_status_lookup`.
    pub status: String,
    /// Label of the latest version, e.g. `"v3.0"`.
    pub current_version: String,
    /// Owner display name, email, or `"Unassigned"`.
    pub owner: String,
    pub owner_user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`Database::create_asset`](crate::Database::create_asset).
#[derive(Debug, Clone, Default)]
pub struct NewAsset {
    pub title: String,
    pub description: Option<String>,
    pub created_by_user_id: Option<i64>,
}

/// Result of a successful status change. `status` echoes the name the caller
/// asked for.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusUpdate {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub owner: String,
    pub current_version: String,
    pub status: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// A numbered snapshot in an asset's submission history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetVersion {
    pub id: i64,
    pub asset_id: i64,
    /// Starts at 1 and grows by one per asset.
    pub version_number: i64,
    pub label: Option<String>,
    pub notes: Option<String>,
    /// Creator display name, email, or `"Unknown"`.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewVersion {
    pub label: Option<String>,
    pub notes: Option<String>,
    pub created_by_user_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetComment {
    pub id: i64,
    pub asset_id: i64,
    pub message: String,
    pub comment_type: String,
    /// Author display name, email, or `"Unknown"`.
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub message: String,
    /// Comment type name; `None` means "General".
    pub comment_type: Option<String>,
    pub author_user_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Users & roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(serialize_with = "id_as_string")]
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub role: Role,
    pub display_name: Option<String>,
}

/// Row of the `user_roles` lookup table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRecord {
    pub id: i64,
    pub role_code: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What the login stub needs to know about an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRecord {
    pub id: i64,
    /// Lowercased email.
    pub email: String,
    pub is_active: bool,
    /// `None` if the stored role code is not one of the known roles.
    pub role: Option<Role>,
}

// ---------------------------------------------------------------------------
// Admin rollups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub pending_review: i64,
    pub changes_requested: i64,
    pub approved: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecentAsset {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub owner: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecentComment {
    pub id: i64,
    pub asset_id: i64,
    pub asset_title: String,
    pub message: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminActivity {
    pub recent_assets: Vec<RecentAsset>,
    pub recent_comments: Vec<RecentComment>,
}

/// Asset counts keyed by status name. Only statuses with at least one asset
/// appear.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StatusSummary {
    pub summary: BTreeMap<String, i64>,
    pub total: i64,
}
