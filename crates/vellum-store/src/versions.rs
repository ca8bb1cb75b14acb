use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};
use vellum_shared::{version_label, AssetStatus};

use crate::assets::asset_exists;
use crate::database::{now_timestamp, parse_timestamp, Database};
use crate::error::{Result, StoreError};
use crate::lookups;
use crate::models::{AssetVersion, NewVersion};

const VERSION_SELECT: &str = "SELECT v.id,
        v.asset_id,
        v.version_number,
        v.label,
        v.notes,
        COALESCE(u.display_name, u.email, 'Unknown'),
        v.created_at
 FROM asset_versions v
 LEFT JOIN users u ON u.id = v.created_by_user_id";

impl Database {
    /// List the versions of an asset, oldest first.
    pub fn list_versions(&self, asset_id: i64) -> Result<Vec<AssetVersion>> {
        let mut stmt = self.conn().prepare(&format!(
            "{VERSION_SELECT} WHERE v.asset_id = ?1 ORDER BY v.version_number ASC"
        ))?;
        let rows = stmt.query_map(params![asset_id], row_to_version)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Record a new version and send the asset back to "In Review".
    ///
    /// The next number is `max(version_number) + 1` for this asset, computed
    /// and inserted under the same immediate transaction. The asset's
    /// `current_version` becomes `v{n}.0`. Returns `None` if the asset does not
    /// exist.
    pub fn create_version(&mut self, asset_id: i64, new: &NewVersion) -> Result<Option<AssetVersion>> {
        let tx = self.immediate()?;

        if !asset_exists(&tx, asset_id)? {
            return Ok(None);
        }

        let max: i64 = tx.query_row(
            "SELECT COALESCE(MAX(version_number), 0) FROM asset_versions WHERE asset_id = ?1",
            params![asset_id],
            |row| row.get(0),
        )?;
        let next = max + 1;
        let now = now_timestamp();

        tx.execute(
            "INSERT INTO asset_versions
                 (asset_id, version_number, label, notes, created_by_user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![asset_id, next, new.label, new.notes, new.created_by_user_id, now],
        )?;
        let version_id = tx.last_insert_rowid();

        match lookups::status_id(&tx, AssetStatus::InReview.name())? {
            Some(status_id) => {
                tx.execute(
                    "UPDATE assets
                     SET status_id = ?1, current_version = ?2, updated_at = ?3
                     WHERE id = ?4",
                    params![status_id, version_label(next), now, asset_id],
                )?;
            }
            None => warn!(asset_id, "'In Review' status missing; asset status left unchanged"),
        }

        let version = fetch_version(&tx, version_id)?.ok_or(StoreError::NotFound)?;
        tx.commit()?;

        info!(asset_id, version_number = next, "asset version created");
        Ok(Some(version))
    }
}

fn fetch_version(conn: &Connection, id: i64) -> Result<Option<AssetVersion>> {
    Ok(conn
        .query_row(
            &format!("{VERSION_SELECT} WHERE v.id = ?1"),
            params![id],
            row_to_version,
        )
        .optional()?)
}

fn row_to_version(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssetVersion> {
    let created_str: String = row.get(6)?;
    Ok(AssetVersion {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        version_number: row.get(2)?,
        label: row.get(3)?,
        notes: row.get(4)?,
        created_by: row.get(5)?,
        created_at: parse_timestamp(6, &created_str)?,
    })
}
