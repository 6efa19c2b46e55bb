//! SQL schema for the Retrans SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Reference tables. Seeded by natural-key upsert; immutable afterwards.
CREATE TABLE IF NOT EXISTS weekdays (
    weekday_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL UNIQUE      -- 'LUNES' .. 'DOMINGO'
);

CREATE TABLE IF NOT EXISTS transmission_statuses (
    status_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL UNIQUE       -- 'Pendiente' | 'Si' | 'No' | 'Tarde'
);

CREATE TABLE IF NOT EXISTS deviation_reasons (
    reason_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    code       TEXT NOT NULL UNIQUE,     -- 'Fta', 'P.Tec', 'Otros', ...
    label      TEXT NOT NULL,
    applies_to TEXT NOT NULL             -- 'did_not_air' | 'aired_late' | 'both'
);

CREATE TABLE IF NOT EXISTS affiliates (
    affiliate_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    active       INTEGER NOT NULL DEFAULT 1,
    created_at   TEXT NOT NULL,          -- ISO 8601 UTC
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS programs (
    program_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT NOT NULL,
    description    TEXT,
    start_time     TEXT NOT NULL DEFAULT '08:00',   -- 'HH:MM'
    state          TEXT NOT NULL DEFAULT 'active',  -- 'active' | 'inactive' | 'ended'
    schedule_start TEXT NOT NULL,                   -- 'YYYY-MM-DD'
    schedule_end   TEXT,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

-- Join tables. Deleting a program (or affiliate) takes its join rows along.
CREATE TABLE IF NOT EXISTS program_weekdays (
    program_id INTEGER NOT NULL REFERENCES programs(program_id)   ON DELETE CASCADE,
    weekday_id INTEGER NOT NULL REFERENCES weekdays(weekday_id)   ON DELETE CASCADE,
    UNIQUE (program_id, weekday_id)
);

CREATE TABLE IF NOT EXISTS program_affiliates (
    program_id   INTEGER NOT NULL REFERENCES programs(program_id)     ON DELETE CASCADE,
    affiliate_id INTEGER NOT NULL REFERENCES affiliates(affiliate_id) ON DELETE CASCADE,
    UNIQUE (program_id, affiliate_id)
);

-- One record per (affiliate, program, date) — enforced here, not by
-- convention. All writes go through a lookup-then-upsert on the triple.
-- Deleting a program or affiliate cascades to its records; that is the
-- deliberate retention design, not a leak.
CREATE TABLE IF NOT EXISTS transmission_records (
    record_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    affiliate_id     INTEGER NOT NULL REFERENCES affiliates(affiliate_id) ON DELETE CASCADE,
    program_id       INTEGER NOT NULL REFERENCES programs(program_id)     ON DELETE CASCADE,
    date             TEXT NOT NULL,     -- 'YYYY-MM-DD', no time component
    status_id        INTEGER NOT NULL REFERENCES transmission_statuses(status_id),
    actual_time      TEXT,              -- 'HH:MM'
    late_time        TEXT,              -- 'HH:MM', late transmissions only
    reason_id        INTEGER REFERENCES deviation_reasons(reason_id),
    free_text_reason TEXT,              -- only alongside the 'Otros' reason
    notes            TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    UNIQUE (affiliate_id, program_id, date)
);

CREATE INDEX IF NOT EXISTS records_date_idx      ON transmission_records(date);
CREATE INDEX IF NOT EXISTS records_affiliate_idx ON transmission_records(affiliate_id);
CREATE INDEX IF NOT EXISTS records_program_idx   ON transmission_records(program_id);

PRAGMA user_version = 1;
";
