//! SQL schema for the OURLAB SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- At most one row per non-null official_code. SQLite treats NULLs as
-- distinct, so code-less rows are kept unique by name in the loader.
CREATE TABLE IF NOT EXISTS university (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    official_code TEXT UNIQUE,
    name_ko       TEXT NOT NULL,
    name_en       TEXT,
    type          TEXT,
    region        TEXT,
    homepage_url  TEXT,
    email_domain  TEXT,
    address       TEXT,
    source        TEXT,
    created_at    TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS department (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    university_id   INTEGER NOT NULL REFERENCES university(id) ON DELETE CASCADE,
    name_ko         TEXT NOT NULL,
    name_en         TEXT,
    parent_college  TEXT,
    degree_bachelor INTEGER NOT NULL DEFAULT 0,
    degree_master   INTEGER NOT NULL DEFAULT 0,
    degree_phd      INTEGER NOT NULL DEFAULT 0,
    source          TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (university_id, name_ko)
);

CREATE TABLE IF NOT EXISTS lab (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    university_id  INTEGER NOT NULL REFERENCES university(id) ON DELETE CASCADE,
    department_id  INTEGER NOT NULL REFERENCES department(id) ON DELETE CASCADE,
    name_ko        TEXT NOT NULL,
    name_en        TEXT,
    professor_name TEXT,
    homepage_url   TEXT,
    aliases        TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    source         TEXT,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,
    UNIQUE (department_id, name_ko)
);

CREATE INDEX IF NOT EXISTS university_name_idx ON university(name_ko);
CREATE INDEX IF NOT EXISTS lab_university_idx  ON lab(university_id);

PRAGMA user_version = 1;
";
