//! v001 -- Initial schema creation.
//!
//! Creates the three lookup tables (`asset_status_lookup`,
//! `comment_type_lookup`, `user_roles`) and the four entity tables (`users`,
//! `assets`, `asset_versions`, `asset_comments`).

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Lookup tables
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS asset_status_lookup (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    status_name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS comment_type_lookup (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    type_name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS user_roles (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    role_code   TEXT NOT NULL UNIQUE,           -- DESIGNER / REVIEWER / ADMIN
    description TEXT,
    created_at  TEXT NOT NULL                   -- RFC-3339
);

-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,                -- placeholder, not a real hash
    role_id       INTEGER NOT NULL,
    is_active     INTEGER NOT NULL DEFAULT 1,   -- boolean 0/1
    display_name  TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,

    FOREIGN KEY (role_id) REFERENCES user_roles(id)
);

-- ----------------------------------------------------------------
-- Assets
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS assets (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    title              TEXT NOT NULL,
    description        TEXT,
    status_id          INTEGER NOT NULL,
    current_version    TEXT NOT NULL DEFAULT 'v1.0',
    created_by_user_id INTEGER,                 -- owning user, nullable
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL,

    FOREIGN KEY (status_id) REFERENCES asset_status_lookup(id),
    FOREIGN KEY (created_by_user_id) REFERENCES users(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_assets_updated_at ON assets(updated_at DESC);

-- ----------------------------------------------------------------
-- Asset versions
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS asset_versions (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    asset_id           INTEGER NOT NULL,
    version_number     INTEGER NOT NULL,
    label              TEXT,
    notes              TEXT,
    created_by_user_id INTEGER,
    created_at         TEXT NOT NULL,

    UNIQUE (asset_id, version_number),
    FOREIGN KEY (asset_id) REFERENCES assets(id) ON DELETE CASCADE,
    FOREIGN KEY (created_by_user_id) REFERENCES users(id) ON DELETE SET NULL
);

-- ----------------------------------------------------------------
-- Asset comments
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS asset_comments (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    asset_id        INTEGER NOT NULL,
    author_user_id  INTEGER,
    comment_type_id INTEGER NOT NULL,
    message         TEXT NOT NULL,
    created_at      TEXT NOT NULL,

    FOREIGN KEY (asset_id) REFERENCES assets(id) ON DELETE CASCADE,
    FOREIGN KEY (author_user_id) REFERENCES users(id) ON DELETE SET NULL,
    FOREIGN KEY (comment_type_id) REFERENCES comment_type_lookup(id)
);

CREATE INDEX IF NOT EXISTS idx_asset_comments_asset_ts
    ON asset_comments(asset_id, created_at);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
