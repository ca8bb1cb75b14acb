//! Read-only rollups for the admin dashboard.

use rusqlite::params;
use vellum_shared::AssetStatus;

use crate::database::{parse_timestamp, Database};
use crate::error::{Result, StoreError};
use crate::models::{AdminOverview, RecentAsset, RecentComment, StatusSummary};

impl Database {
    /// Count assets per dashboard bucket in a single grouped query.
    ///
    /// Only "In Review", "Changes Requested" and "Approved" are reported; any
    /// other status (including "Draft") is left out.
    pub fn admin_overview(&self) -> Result<AdminOverview> {
        let mut stmt = self.conn().prepare(
            "SELECT s.status_name, COUNT(a.id)
             FROM asset_status_lookup s
             LEFT JOIN assets a ON a.status_id = s.id
             GROUP BY s.id, s.status_name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut overview = AdminOverview::default();
        for row in rows {
            let (name, count) = row?;
            match AssetStatus::from_name(&name) {
                Ok(AssetStatus::InReview) => overview.pending_review = count,
                Ok(AssetStatus::ChangesRequested) => overview.changes_requested = count,
                Ok(AssetStatus::Approved) => overview.approved = count,
                _ => {}
            }
        }
        Ok(overview)
    }

    /// Most recently updated assets, newest first.
    pub fn recent_assets(&self, limit: u32) -> Result<Vec<RecentAsset>> {
        let mut stmt = self.conn().prepare(
            "SELECT a.id,
                    a.title,
                    s.status_name,
                    COALESCE(u.display_name, u.email, 'Unassigned'),
                    a.updated_at
             FROM assets a
             JOIN asset_status_lookup s ON s.id = a.status_id
             LEFT JOIN users u ON u.id = a.created_by_user_id
             ORDER BY a.updated_at DESC, a.id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            let updated_str: String = row.get(4)?;
            Ok(RecentAsset {
                id: row.get(0)?,
                title: row.get(1)?,
                status: row.get(2)?,
                owner: row.get(3)?,
                updated_at: parse_timestamp(4, &updated_str)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Most recently created comments across all assets, newest first.
    pub fn recent_comments(&self, limit: u32) -> Result<Vec<RecentComment>> {
        let mut stmt = self.conn().prepare(
            "SELECT c.id,
                    c.asset_id,
                    a.title,
                    c.message,
                    COALESCE(u.display_name, u.email, 'Unknown'),
                    c.created_at
             FROM asset_comments c
             JOIN assets a ON a.id = c.asset_id
             LEFT JOIN users u ON u.id = c.author_user_id
             ORDER BY c.created_at DESC, c.id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            let created_str: String = row.get(5)?;
            Ok(RecentComment {
                id: row.get(0)?,
                asset_id: row.get(1)?,
                asset_title: row.get(2)?,
                message: row.get(3)?,
                author: row.get(4)?,
                created_at: parse_timestamp(5, &created_str)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Asset counts per status name. Statuses with no assets are omitted.
    pub fn status_summary(&self) -> Result<StatusSummary> {
        let mut stmt = self.conn().prepare(
            "SELECT s.status_name, COUNT(*)
             FROM assets a
             JOIN asset_status_lookup s ON s.id = a.status_id
             GROUP BY s.status_name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut summary = StatusSummary::default();
        for row in rows {
            let (name, count) = row?;
            summary.total += count;
            summary.summary.insert(name, count);
        }
        Ok(summary)
    }
}
