// ==========================================
// Competition Scheduler - SQLite connection setup
// ==========================================
// - same PRAGMA set on every connection (foreign keys, busy timeout)
// - idempotent schema bootstrap for the scheduling tables
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version written by `init_schema`
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply the shared PRAGMA set. Both settings are per connection.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a connection with the shared configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create every scheduling table if missing and record the schema version.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS competitions (
            competition_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            schedule_state TEXT NOT NULL DEFAULT 'DRAFT',
            schedule_revision INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS sessions (
            session_id TEXT PRIMARY KEY,
            competition_id TEXT NOT NULL REFERENCES competitions(competition_id) ON DELETE CASCADE,
            session_number INTEGER NOT NULL,
            session_name TEXT,
            session_date TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT,
            max_entries INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_competition
            ON sessions(competition_id, start_time);

        CREATE TABLE IF NOT EXISTS entries (
            entry_id TEXT PRIMARY KEY,
            competition_id TEXT NOT NULL REFERENCES competitions(competition_id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            studio_id TEXT NOT NULL,
            studio_name TEXT NOT NULL DEFAULT '',
            category_id TEXT NOT NULL DEFAULT '',
            category_name TEXT NOT NULL DEFAULT '',
            age_group_id TEXT NOT NULL DEFAULT '',
            age_group_name TEXT NOT NULL DEFAULT '',
            entry_size_category_id TEXT NOT NULL DEFAULT '',
            duration_minutes INTEGER,
            warm_up_minutes INTEGER,
            session_id TEXT REFERENCES sessions(session_id) ON DELETE SET NULL,
            performance_time TEXT,
            running_order INTEGER,
            entry_number INTEGER,
            entry_suffix TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_entries_competition ON entries(competition_id);
        CREATE INDEX IF NOT EXISTS idx_entries_session ON entries(session_id, running_order);

        CREATE TABLE IF NOT EXISTS entry_participants (
            entry_id TEXT NOT NULL REFERENCES entries(entry_id) ON DELETE CASCADE,
            dancer_id TEXT NOT NULL,
            dancer_name TEXT NOT NULL DEFAULT '',
            dancer_age INTEGER,
            PRIMARY KEY (entry_id, dancer_id)
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS schedule_action_log (
            action_id TEXT PRIMARY KEY,
            competition_id TEXT NOT NULL,
            action_type TEXT NOT NULL,
            action_ts TEXT NOT NULL,
            actor TEXT NOT NULL,
            session_id TEXT,
            payload_json TEXT,
            detail TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_schedule_action_log_competition
            ON schedule_action_log(competition_id, action_ts);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// Read schema_version (None when the table does not exist).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
