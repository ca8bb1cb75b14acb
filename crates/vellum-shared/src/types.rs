use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Caller role. Serialized lowercase on the wire, stored uppercase in the
/// `user_roles` lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Designer,
    Reviewer,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Designer, Role::Reviewer, Role::Admin];

    /// Parse a caller-facing role string. Case and surrounding whitespace are
    /// ignored.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "designer" => Ok(Self::Designer),
            "reviewer" => Ok(Self::Reviewer),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseError::UnknownRole(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Designer => "designer",
            Self::Reviewer => "reviewer",
            Self::Admin => "admin",
        }
    }

    /// Code used in the `user_roles` lookup table.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Designer => "DESIGNER",
            Self::Reviewer => "REVIEWER",
            Self::Admin => "ADMIN",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "DESIGNER" => Some(Self::Designer),
            "REVIEWER" => Some(Self::Reviewer),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review status of an asset. The display names double as the keys of the
/// `asset_status_lookup` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetStatus {
    #[serde(rename = "Draft")]
    Draft,
    #[serde(rename = "In Review")]
    InReview,
    #[serde(rename = "Approved")]
    Approved,
    #[serde(rename = "Changes Requested")]
    ChangesRequested,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 4] = [
        AssetStatus::Draft,
        AssetStatus::InReview,
        AssetStatus::Approved,
        AssetStatus::ChangesRequested,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::InReview => "In Review",
            Self::Approved => "Approved",
            Self::ChangesRequested => "Changes Requested",
        }
    }

    /// Exact-match lookup; status names are case sensitive.
    pub fn from_name(name: &str) -> Result<Self, ParseError> {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| ParseError::UnknownStatus(name.to_string()))
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of review comment, resolved through `comment_type_lookup`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentType {
    #[default]
    #[serde(rename = "General")]
    General,
    #[serde(rename = "Approval")]
    Approval,
    #[serde(rename = "Changes Requested")]
    ChangesRequested,
}

impl CommentType {
    pub const ALL: [CommentType; 3] = [
        CommentType::General,
        CommentType::Approval,
        CommentType::ChangesRequested,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Approval => "Approval",
            Self::ChangesRequested => "Changes Requested",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ParseError> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ParseError::UnknownCommentType(name.to_string()))
    }
}

/// Human-readable label for a version number, e.g. `3` -> `"v3.0"`.
pub fn version_label(version_number: i64) -> String {
    format!("v{version_number}.0")
}
