//! v002 -- Seed reference data.
//!
//! Fills the lookup tables from the shared enums and creates the three demo
//! accounts used by the login stub.

use rusqlite::{params, Connection};
use vellum_shared::constants::PLACEHOLDER_PASSWORD_HASH;
use vellum_shared::{AssetStatus, CommentType, Role};

use crate::database::now_timestamp;

const SEED_ACCOUNTS: [(&str, &str, Role); 3] = [
    ("admin@vellum.test", "Admin User", Role::Admin),
    ("designer@vellum.test", "Designer User", Role::Designer),
    ("reviewer@vellum.test", "Reviewer User", Role::Reviewer),
];

fn role_description(role: Role) -> &'static str {
    match role {
        Role::Designer => "Designer/Contributor",
        Role::Reviewer => "Creative Reviewer",
        Role::Admin => "Admin/Project Owner",
    }
}

/// Apply the seed migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    let now = now_timestamp();

    for status in AssetStatus::ALL {
        conn.execute(
            "INSERT OR IGNORE INTO asset_status_lookup (status_name) VALUES (?1)",
            params![status.name()],
        )?;
    }

    for kind in CommentType::ALL {
        conn.execute(
            "INSERT OR IGNORE INTO comment_type_lookup (type_name) VALUES (?1)",
            params![kind.name()],
        )?;
    }

    for role in Role::ALL {
        conn.execute(
            "INSERT OR IGNORE INTO user_roles (role_code, description, created_at)
             VALUES (?1, ?2, ?3)",
            params![role.code(), role_description(role), now],
        )?;
    }

    for (email, display_name, role) in SEED_ACCOUNTS {
        conn.execute(
            "INSERT OR IGNORE INTO users
                 (email, password_hash, role_id, is_active, display_name, created_at, updated_at)
             SELECT ?1, ?2, r.id, 1, ?3, ?4, ?4
             FROM user_roles r
             WHERE r.role_code = ?5",
            params![
                email,
                PLACEHOLDER_PASSWORD_HASH,
                display_name,
                now,
                role.code()
            ],
        )?;
    }

    Ok(())
}
