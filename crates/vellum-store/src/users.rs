//! User account lifecycle. Accounts are never hard-deleted: deactivation keeps
//! asset owners and comment authors resolvable.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;
use vellum_shared::constants::PLACEHOLDER_PASSWORD_HASH;
use vellum_shared::Role;

use crate::database::{now_timestamp, Database};
use crate::error::{Result, StoreError};
use crate::lookups;
use crate::models::{LoginRecord, NewAccount, UserAccount};

const USER_SELECT: &str = "SELECT u.id, u.email, u.display_name, u.is_active, r.role_code
 FROM users u
 JOIN user_roles r ON r.id = u.role_id";

impl Database {
    /// List all accounts, ordered by id.
    pub fn list_users(&self) -> Result<Vec<UserAccount>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{USER_SELECT} ORDER BY u.id ASC"))?;
        let rows = stmt.query_map([], row_to_user)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserAccount>> {
        fetch_user(self.conn(), id)
    }

    /// Create an account, or update the existing one with the same email
    /// (case-insensitive): the role is replaced, the account is reactivated
    /// and the display name is replaced only when a new one is given.
    pub fn create_account(&mut self, new: &NewAccount) -> Result<UserAccount> {
        let email = new.email.trim();
        let display_name = new
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let tx = self.immediate()?;
        let role_id = lookups::role_id(&tx, new.role)?;

        let id: i64 = tx.query_row(
            "INSERT INTO users
                 (email, password_hash, role_id, is_active, display_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?5, ?5)
             ON CONFLICT (email) DO UPDATE
                 SET role_id      = excluded.role_id,
                     is_active    = 1,
                     display_name = COALESCE(excluded.display_name, users.display_name),
                     updated_at   = excluded.updated_at
             RETURNING id",
            params![email, PLACEHOLDER_PASSWORD_HASH, role_id, display_name, now_timestamp()],
            |row| row.get(0),
        )?;

        let user = fetch_user(&tx, id)?.ok_or(StoreError::NotFound)?;
        tx.commit()?;

        info!(user_id = id, email = %user.email, role = %user.role, "account created or reactivated");
        Ok(user)
    }

    /// Change a user's role. `None` if no such user.
    pub fn update_user_role(&mut self, id: i64, role: Role) -> Result<Option<UserAccount>> {
        self.update_user(id, None, Some(role))
    }

    /// Activate or deactivate a user. The returned account always carries the
    /// user's current role. `None` if no such user.
    pub fn set_user_active(&mut self, id: i64, is_active: bool) -> Result<Option<UserAccount>> {
        self.update_user(id, Some(is_active), None)
    }

    /// Apply an active-flag change and a role change in one transaction.
    /// The flag is written first. `None` if no such user.
    pub fn update_user(
        &mut self,
        id: i64,
        is_active: Option<bool>,
        role: Option<Role>,
    ) -> Result<Option<UserAccount>> {
        let now = now_timestamp();
        let tx = self.immediate()?;

        if let Some(active) = is_active {
            let affected = tx.execute(
                "UPDATE users SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
                params![active, now, id],
            )?;
            if affected == 0 {
                return Ok(None);
            }
        }

        if let Some(role) = role {
            let role_id = lookups::role_id(&tx, role)?;
            let affected = tx.execute(
                "UPDATE users SET role_id = ?1, updated_at = ?2 WHERE id = ?3",
                params![role_id, now, id],
            )?;
            if affected == 0 {
                return Ok(None);
            }
        }

        let Some(user) = fetch_user(&tx, id)? else {
            return Ok(None);
        };
        tx.commit()?;

        info!(user_id = id, ?is_active, ?role, "user updated");
        Ok(Some(user))
    }

    /// Soft delete.
    pub fn deactivate_user(&mut self, id: i64) -> Result<Option<UserAccount>> {
        self.set_user_active(id, false)
    }

    /// Look up the login-relevant fields of an account by email
    /// (case-insensitive).
    pub fn find_login(&self, email: &str) -> Result<Option<LoginRecord>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT u.id, LOWER(u.email), u.is_active, r.role_code
                 FROM users u
                 JOIN user_roles r ON r.id = u.role_id
                 WHERE u.email = ?1
                 LIMIT 1",
                params![email.trim()],
                |row| {
                    let code: String = row.get(3)?;
                    Ok(LoginRecord {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        is_active: row.get(2)?,
                        role: Role::from_code(&code),
                    })
                },
            )
            .optional()?)
    }
}

fn fetch_user(conn: &Connection, id: i64) -> Result<Option<UserAccount>> {
    Ok(conn
        .query_row(
            &format!("{USER_SELECT} WHERE u.id = ?1"),
            params![id],
            row_to_user,
        )
        .optional()?)
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserAccount> {
    let code: String = row.get(4)?;
    let role = Role::from_code(&code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown role code '{code}'").into(),
        )
    })?;

    Ok(UserAccount {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        is_active: row.get(3)?,
        role,
    })
}
