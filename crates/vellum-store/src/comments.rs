//! Review comments on assets. Comments are never edited; admins may delete
//! them.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use vellum_shared::{CommentType, ParseError};

use crate::assets::asset_exists;
use crate::database::{now_timestamp, parse_timestamp, Database};
use crate::error::{Result, StoreError};
use crate::lookups;
use crate::models::{AssetComment, NewComment};

/// What to do when a comment names a type missing from
/// `comment_type_lookup`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentTypePolicy {
    /// Fail with [`StoreError::UnknownCommentType`].
    #[default]
    Reject,
    /// Store the comment as "General".
    FallbackToGeneral,
}

impl std::str::FromStr for CommentTypePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "general" | "fallback" => Ok(Self::FallbackToGeneral),
            other => Err(format!("unknown comment type policy '{other}'")),
        }
    }
}

const COMMENT_SELECT: &str = "SELECT c.id,
        c.asset_id,
        c.message,
        t.type_name,
        COALESCE(u.display_name, u.email, 'Unknown'),
        c.created_at
 FROM asset_comments c
 JOIN comment_type_lookup t ON t.id = c.comment_type_id
 LEFT JOIN users u ON u.id = c.author_user_id";

impl Database {
    /// List the comments on an asset, oldest first.
    pub fn list_comments(&self, asset_id: i64) -> Result<Vec<AssetComment>> {
        let mut stmt = self.conn().prepare(&format!(
            "{COMMENT_SELECT} WHERE c.asset_id = ?1 ORDER BY c.created_at ASC, c.id ASC"
        ))?;
        let rows = stmt.query_map(params![asset_id], row_to_comment)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Add a comment. Returns `None` if the asset does not exist.
    pub fn add_comment(
        &mut self,
        asset_id: i64,
        new: &NewComment,
        policy: CommentTypePolicy,
    ) -> Result<Option<AssetComment>> {
        let tx = self.immediate()?;

        if !asset_exists(&tx, asset_id)? {
            return Ok(None);
        }

        let kind = match new.comment_type.as_deref() {
            None => CommentType::General,
            Some(requested) => match CommentType::from_name(requested) {
                Ok(kind) => kind,
                Err(ParseError::UnknownCommentType(name)) if policy == CommentTypePolicy::Reject => {
                    return Err(StoreError::UnknownCommentType(name));
                }
                Err(_) => {
                    debug!(requested, "unknown comment type, storing as General");
                    CommentType::General
                }
            },
        };
        let type_id = lookups::comment_type_id(&tx, kind.name())?
            .ok_or_else(|| StoreError::MissingLookup(format!("comment type '{}'", kind.name())))?;

        tx.execute(
            "INSERT INTO asset_comments (asset_id, author_user_id, comment_type_id, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![asset_id, new.author_user_id, type_id, new.message, now_timestamp()],
        )?;
        let comment_id = tx.last_insert_rowid();

        let comment = fetch_comment(&tx, comment_id)?.ok_or(StoreError::NotFound)?;
        tx.commit()?;

        info!(asset_id, comment_id, "comment added");
        Ok(Some(comment))
    }

    /// Delete a comment by id.  Returns `true` if a row was deleted.
    pub fn delete_comment(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM asset_comments WHERE id = ?1", params![id])?;
        if affected > 0 {
            info!(comment_id = id, "comment deleted");
        }
        Ok(affected > 0)
    }
}

fn fetch_comment(conn: &Connection, id: i64) -> Result<Option<AssetComment>> {
    Ok(conn
        .query_row(
            &format!("{COMMENT_SELECT} WHERE c.id = ?1"),
            params![id],
            row_to_comment,
        )
        .optional()?)
}

fn row_to_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssetComment> {
    let created_str: String = row.get(5)?;
    Ok(AssetComment {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        message: row.get(2)?,
        comment_type: row.get(3)?,
        author: row.get(4)?,
        created_at: parse_timestamp(5, &created_str)?,
    })
}
