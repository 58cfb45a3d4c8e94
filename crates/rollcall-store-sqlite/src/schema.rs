//! SQL schema for the rollcall SQLite store.
//!
//! Executed at every connection startup; idempotent thanks to
//! `IF NOT EXISTS`. `PRAGMA user_version` records the layout version.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

-- AUTOINCREMENT so a guest id is never handed out twice, even after a
-- replace-import empties the table.
CREATE TABLE IF NOT EXISTS guests (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    display_name  TEXT NOT NULL CHECK (display_name != ''),
    member_host   TEXT NOT NULL DEFAULT '',
    name_key      TEXT NOT NULL,   -- lower-cased display_name
    host_key      TEXT NOT NULL,   -- lower-cased member_host
    source_row    INTEGER,
    created_at    TEXT NOT NULL    -- RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS guests_host_idx ON guests(host_key);
CREATE INDEX IF NOT EXISTS guests_key_idx  ON guests(name_key, host_key);

CREATE TABLE IF NOT EXISTS checkins (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    guest_id  INTEGER NOT NULL REFERENCES guests(id) ON DELETE CASCADE,
    in_ts     TEXT NOT NULL,
    out_ts    TEXT,            -- NULL while the session is open
    in_by     TEXT,
    out_by    TEXT
);

CREATE INDEX IF NOT EXISTS checkins_guest_idx ON checkins(guest_id);

-- At most one open session per guest.
CREATE UNIQUE INDEX IF NOT EXISTS checkins_open_idx
    ON checkins(guest_id) WHERE out_ts IS NULL;

-- Append-only; rows leave only through undo or a replace-import.
CREATE TABLE IF NOT EXISTS attendance_events (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    guest_id    INTEGER NOT NULL REFERENCES guests(id) ON DELETE CASCADE,
    checkin_id  INTEGER NOT NULL REFERENCES checkins(id) ON DELETE CASCADE,
    ts          TEXT NOT NULL,
    action      TEXT NOT NULL CHECK (action IN ('in', 'out'))
);

-- Prefix search index over guests. Never a source of truth; the triggers
-- below keep it in step with every guest insert, update and delete.
CREATE VIRTUAL TABLE IF NOT EXISTS guest_fts USING fts5(
    display_name,
    member_host,
    content='guests',
    content_rowid='id',
    tokenize='unicode61 remove_diacritics 2'
);

CREATE TRIGGER IF NOT EXISTS guests_ai AFTER INSERT ON guests BEGIN
    INSERT INTO guest_fts(rowid, display_name, member_host)
    VALUES (new.id, new.display_name, new.member_host);
END;

CREATE TRIGGER IF NOT EXISTS guests_ad AFTER DELETE ON guests BEGIN
    INSERT INTO guest_fts(guest_fts, rowid, display_name, member_host)
    VALUES ('delete', old.id, old.display_name, old.member_host);
END;

CREATE TRIGGER IF NOT EXISTS guests_au AFTER UPDATE ON guests BEGIN
    INSERT INTO guest_fts(guest_fts, rowid, display_name, member_host)
    VALUES ('delete', old.id, old.display_name, old.member_host);
    INSERT INTO guest_fts(rowid, display_name, member_host)
    VALUES (new.id, new.display_name, new.member_host);
END;

PRAGMA user_version = 1;
";
