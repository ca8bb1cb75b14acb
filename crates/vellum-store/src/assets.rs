//! Asset lifecycle: create, read, owner assignment, status transitions and
//! cascading delete.
//!
//! Every mutation that changes display-relevant fields re-reads the asset
//! through [`fetch_asset`] before returning, so callers always get the same
//! shape `list_assets` / `get_asset` would show.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use vellum_shared::constants::INITIAL_VERSION_LABEL;
use vellum_shared::AssetStatus;

use crate::database::{now_timestamp, parse_timestamp, Database};
use crate::error::{Result, StoreError};
use crate::lookups;
use crate::models::{Asset, NewAsset, StatusUpdate};

const ASSET_SELECT: &str = "SELECT a.id,
        a.title,
        a.description,
        s.status_name,
        a.current_version,
        COALESCE(u.display_name, u.email, 'Unassigned'),
        a.created_by_user_id,
        a.created_at,
        a.updated_at
 FROM assets a
 JOIN asset_status_lookup s ON s.id = a.status_id
 LEFT JOIN users u ON u.id = a.created_by_user_id";

impl Database {
    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// List all assets, newest id first.
    pub fn list_assets(&self) -> Result<Vec<Asset>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{ASSET_SELECT} ORDER BY a.id DESC"))?;
        let rows = stmt.query_map([], row_to_asset)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Fetch a single asset. `None` if the id does not exist.
    pub fn get_asset(&self, id: i64) -> Result<Option<Asset>> {
        fetch_asset(self.conn(), id)
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a Draft asset at `v1.0` together with its first version row.
    ///
    /// Both rows are written in one transaction; the seed version records the
    /// same creator as the asset.
    pub fn create_asset(&mut self, new: &NewAsset) -> Result<Asset> {
        let tx = self.immediate()?;

        let status_id = lookups::require_status_id(&tx, AssetStatus::Draft.name())?;
        let now = now_timestamp();

        tx.execute(
            "INSERT INTO assets
                 (title, description, status_id, current_version, created_by_user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                new.title,
                new.description,
                status_id,
                INITIAL_VERSION_LABEL,
                new.created_by_user_id,
                now,
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO asset_versions (asset_id, version_number, created_by_user_id, created_at)
             VALUES (?1, 1, ?2, ?3)",
            params![id, new.created_by_user_id, now],
        )?;

        let asset = fetch_asset(&tx, id)?.ok_or(StoreError::NotFound)?;
        tx.commit()?;

        info!(asset_id = id, title = %asset.title, "asset created");
        Ok(asset)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Assign (or with `None`, clear) the owning user.
    pub fn set_asset_owner(&mut self, id: i64, owner_user_id: Option<i64>) -> Result<Option<Asset>> {
        let tx = self.immediate()?;

        let affected = tx.execute(
            "UPDATE assets SET created_by_user_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![owner_user_id, now_timestamp(), id],
        )?;
        if affected == 0 {
            return Ok(None);
        }

        let asset = fetch_asset(&tx, id)?;
        tx.commit()?;

        info!(asset_id = id, owner = ?owner_user_id, "asset owner changed");
        Ok(asset)
    }

    /// Move an asset to the named status.
    ///
    /// The name is validated against the status lookup first, so an unknown
    /// name yields [`StoreError::InvalidStatus`] whether or not the asset
    /// exists. A known name on a missing asset yields `Ok(None)`.
    pub fn update_asset_status(&mut self, id: i64, status_name: &str) -> Result<Option<StatusUpdate>> {
        let tx = self.immediate()?;

        let Some(status_id) = lookups::status_id(&tx, status_name)? else {
            debug!(asset_id = id, status = status_name, "rejected unknown status");
            return Err(StoreError::InvalidStatus(status_name.to_string()));
        };

        let affected = tx.execute(
            "UPDATE assets SET status_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![status_id, now_timestamp(), id],
        )?;
        if affected == 0 {
            return Ok(None);
        }

        let Some(asset) = fetch_asset(&tx, id)? else {
            return Ok(None);
        };
        tx.commit()?;

        info!(asset_id = id, status = status_name, "asset status changed");
        Ok(Some(StatusUpdate {
            id: asset.id,
            title: asset.title,
            description: asset.description,
            owner: asset.owner,
            current_version: asset.current_version,
            status: status_name.to_string(),
            updated_at: asset.updated_at,
        }))
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    // ON DELETE CASCADE: versions + comments go with it
    pub fn delete_asset(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM assets WHERE id = ?1", params![id])?;
        if affected > 0 {
            info!(asset_id = id, "asset deleted");
        }
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Canonical single-asset read, usable inside a transaction.
pub(crate) fn fetch_asset(conn: &Connection, id: i64) -> Result<Option<Asset>> {
    Ok(conn
        .query_row(
            &format!("{ASSET_SELECT} WHERE a.id = ?1"),
            params![id],
            row_to_asset,
        )
        .optional()?)
}

pub(crate) fn asset_exists(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM assets WHERE id = ?1", params![id], |_| Ok(()))
        .optional()?
        .is_some())
}

/// Map a `rusqlite::Row` produced by [`ASSET_SELECT`] to an [`Asset`].
fn row_to_asset(row: &rusqlite::Row<'_>) -> rusqlite::Result<Asset> {
    let created_str: String = row.get(7)?;
    let updated_str: String = row.get(8)?;

    Ok(Asset {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        current_version: row.get(4)?,
        owner: row.get(5)?,
        owner_user_id: row.get(6)?,
        created_at: parse_timestamp(7, &created_str)?,
        updated_at: parse_timestamp(8, &updated_str)?,
    })
}
