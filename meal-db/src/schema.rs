//! Meal database schema
//!
//! Times are stored as microseconds since the Unix epoch, calendar dates as
//! `YYYY-MM-DD` text and prices as decimal text.

/// Schema DDL, idempotent
pub const MEAL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS governments (
    id              TEXT PRIMARY KEY,
    name            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schools (
    id              TEXT PRIMARY KEY,
    government_id   TEXT NOT NULL REFERENCES governments(id),
    name            TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_schools_government ON schools(government_id);

CREATE TABLE IF NOT EXISTS menus (
    id                  TEXT PRIMARY KEY,
    government_id       TEXT NOT NULL REFERENCES governments(id),
    name                TEXT NOT NULL,
    description         TEXT,
    serving_date        TEXT NOT NULL,
    price_per_portion   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    id              TEXT PRIMARY KEY,
    school_id       TEXT NOT NULL REFERENCES schools(id),
    student_number  TEXT NOT NULL,
    name            TEXT NOT NULL,
    class_name      TEXT NOT NULL,
    grade           TEXT NOT NULL,
    UNIQUE (school_id, student_number)
);

CREATE TABLE IF NOT EXISTS allocations (
    id              TEXT PRIMARY KEY,
    school_id       TEXT NOT NULL REFERENCES schools(id),
    menu_id         TEXT NOT NULL REFERENCES menus(id),
    quantity        INTEGER NOT NULL CHECK (quantity > 0),
    service_date    TEXT NOT NULL,
    created_at      INTEGER NOT NULL,
    updated_at      INTEGER NOT NULL,
    UNIQUE (school_id, menu_id, service_date)
);
CREATE INDEX IF NOT EXISTS idx_allocations_school_date ON allocations(school_id, service_date DESC);
CREATE INDEX IF NOT EXISTS idx_allocations_menu ON allocations(menu_id);

CREATE TABLE IF NOT EXISTS claim_events (
    id              TEXT PRIMARY KEY,
    student_id      TEXT NOT NULL REFERENCES students(id),
    allocation_id   TEXT NOT NULL REFERENCES allocations(id),
    claimed_at      INTEGER NOT NULL,
    UNIQUE (student_id, allocation_id)
);
CREATE INDEX IF NOT EXISTS idx_claim_events_allocation ON claim_events(allocation_id, claimed_at);
CREATE INDEX IF NOT EXISTS idx_claim_events_student ON claim_events(student_id, claimed_at);

CREATE TRIGGER IF NOT EXISTS claim_events_no_update
BEFORE UPDATE ON claim_events
BEGIN
    SELECT RAISE(ABORT, 'claim_events is append-only');
END;

CREATE TRIGGER IF NOT EXISTS claim_events_no_delete
BEFORE DELETE ON claim_events
BEGIN
    SELECT RAISE(ABORT, 'claim_events is append-only');
END;
"#;
