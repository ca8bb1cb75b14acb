//! Lookup resolvers: map status names, comment type names and role codes to
//! the ids stored on entity rows.

use rusqlite::{params, Connection, OptionalExtension};
use vellum_shared::Role;

use crate::database::{parse_timestamp, Database};
use crate::error::{Result, StoreError};
use crate::models::RoleRecord;

/// Resolve a status name (exact match) to its lookup id.
pub(crate) fn status_id(conn: &Connection, status_name: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM asset_status_lookup WHERE status_name = ?1 LIMIT 1",
            params![status_name],
            |row| row.get(0),
        )
        .optional()?)
}

/// Like [`status_id`] but treats absence as broken reference data.
pub(crate) fn require_status_id(conn: &Connection, status_name: &str) -> Result<i64> {
    status_id(conn, status_name)?
        .ok_or_else(|| StoreError::MissingLookup(format!("status '{status_name}'")))
}

pub(crate) fn comment_type_id(conn: &Connection, type_name: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM comment_type_lookup WHERE type_name = ?1 LIMIT 1",
            params![type_name],
            |row| row.get(0),
        )
        .optional()?)
}

pub(crate) fn role_id(conn: &Connection, role: Role) -> Result<i64> {
    conn.query_row(
        "SELECT id FROM user_roles WHERE role_code = ?1 LIMIT 1",
        params![role.code()],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| StoreError::MissingLookup(format!("role '{}'", role.code())))
}

impl Database {
    /// All rows of the role lookup table, ordered by id.
    pub fn list_roles(&self) -> Result<Vec<RoleRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, role_code, description, created_at
             FROM user_roles
             ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_role)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Find a role by code. The code is matched case-insensitively.
    pub fn role_by_code(&self, code: &str) -> Result<Option<RoleRecord>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, role_code, description, created_at
                 FROM user_roles
                 WHERE role_code = ?1",
                params![code.trim().to_ascii_uppercase()],
                row_to_role,
            )
            .optional()?)
    }

    pub fn role_by_id(&self, id: i64) -> Result<Option<RoleRecord>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, role_code, description, created_at
                 FROM user_roles
                 WHERE id = ?1",
                params![id],
                row_to_role,
            )
            .optional()?)
    }
}

fn row_to_role(row: &rusqlite::Row<'_>) -> rusqlite::Result<RoleRecord> {
    let created_str: String = row.get(3)?;
    Ok(RoleRecord {
        id: row.get(0)?,
        role_code: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_timestamp(3, &created_str)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_shared::{AssetStatus, CommentType};

    #[test]
    fn seeded_statuses_resolve() {
        let db = Database::open_in_memory().unwrap();
        for status in AssetStatus::ALL {
            assert!(status_id(db.conn(), status.name()).unwrap().is_some());
        }
        assert_eq!(status_id(db.conn(), "NOT_A_REAL_STATUS").unwrap(), None);
        assert_eq!(status_id(db.conn(), "draft").unwrap(), None);
    }

    #[test]
    fn seeded_comment_types_resolve() {
        let db = Database::open_in_memory().unwrap();
        for kind in CommentType::ALL {
            assert!(comment_type_id(db.conn(), kind.name()).unwrap().is_some());
        }
        assert_eq!(comment_type_id(db.conn(), "Rant").unwrap(), None);
    }

    #[test]
    fn role_lookup_by_code_and_id() {
        let db = Database::open_in_memory().unwrap();

        let roles = db.list_roles().unwrap();
        let codes: Vec<_> = roles.iter().map(|r| r.role_code.as_str()).collect();
        assert_eq!(codes, vec!["DESIGNER", "REVIEWER", "ADMIN"]);

        let admin = db.role_by_code("admin").unwrap().expect("admin role");
        assert_eq!(admin.role_code, "ADMIN");
        assert_eq!(db.role_by_id(admin.id).unwrap(), Some(admin.clone()));
        assert_eq!(role_id(db.conn(), Role::Admin).unwrap(), admin.id);

        assert_eq!(db.role_by_code("GUEST").unwrap(), None);
        assert_eq!(db.role_by_id(9_999).unwrap(), None);
    }
}
