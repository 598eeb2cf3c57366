//! SQL schema for the Hum SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    created_at    TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    display_name  TEXT NOT NULL,
    password_hash TEXT NOT NULL
);

-- Posts and articles share one table; `kind` scopes every query.
-- The counters are written only by the vote transaction.
CREATE TABLE IF NOT EXISTS items (
    item_id        TEXT PRIMARY KEY,
    kind           TEXT NOT NULL,   -- 'post' | 'article'
    created_at     TEXT NOT NULL,   -- fixed-width RFC 3339 UTC
    title          TEXT NOT NULL,
    content        TEXT NOT NULL,
    category       TEXT NOT NULL,
    image_url      TEXT,
    details_json   TEXT NOT NULL,   -- kind-specific fields, without the tag
    upvote_count   INTEGER NOT NULL DEFAULT 0 CHECK (upvote_count   >= 0),
    downvote_count INTEGER NOT NULL DEFAULT 0 CHECK (downvote_count >= 0)
);

-- At most one vote per (user, item).
CREATE TABLE IF NOT EXISTS votes (
    user_id   TEXT NOT NULL REFERENCES users(user_id),
    item_id   TEXT NOT NULL REFERENCES items(item_id),
    direction TEXT NOT NULL CHECK (direction IN ('up', 'down')),
    voted_at  TEXT NOT NULL,
    PRIMARY KEY (user_id, item_id)
);

CREATE INDEX IF NOT EXISTS items_kind_created_idx ON items(kind, created_at);
CREATE INDEX IF NOT EXISTS items_kind_votes_idx   ON items(kind, upvote_count, downvote_count);
CREATE INDEX IF NOT EXISTS votes_item_idx         ON votes(item_id);

PRAGMA user_version = 1;
";
