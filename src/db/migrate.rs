use crate::db::log::ttlog;
use crate::errors::{AppError, AppResult};
use crate::schema::Collection;
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, params};

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )
}

fn ensure_migrations_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            name       TEXT NOT NULL,
            applied_at TEXT NOT NULL
        );
        "#,
    )
}

/// v1: one document table per remote collection.
fn create_collection_tables(conn: &Connection) -> rusqlite::Result<()> {
    for table in Collection::remote().filter_map(|c| c.table_name()) {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id   TEXT PRIMARY KEY,
                body TEXT NOT NULL CHECK(json_valid(body))
            );"
        ))?;
    }
    Ok(())
}

/// v2: expression indexes on the foreign keys used to list children
/// (tasks of a project, entries and comments of a task) and on the entry
/// date used by range filters. Queries spell these paths inline.
fn create_lookup_indexes(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_tasks_project
            ON tasks(json_extract(body, '$.project'));
        CREATE INDEX IF NOT EXISTS idx_time_entries_task
            ON time_entries(json_extract(body, '$.task'));
        CREATE INDEX IF NOT EXISTS idx_time_entries_project
            ON time_entries(json_extract(body, '$.project'));
        CREATE INDEX IF NOT EXISTS idx_time_entries_date
            ON time_entries(json_extract(body, '$.date'));
        CREATE INDEX IF NOT EXISTS idx_comments_task
            ON comments(json_extract(body, '$.task'));
        "#,
    )
}

type Migration = (i64, &'static str, fn(&Connection) -> rusqlite::Result<()>);

const MIGRATIONS: &[Migration] = &[
    (1, "collection_tables", create_collection_tables),
    (2, "lookup_indexes", create_lookup_indexes),
];

fn is_applied(conn: &Connection, version: i64) -> rusqlite::Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT version FROM schema_migrations WHERE version = ?1",
            [version],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Highest applied migration version, 0 on a fresh database.
pub fn current_version(conn: &Connection) -> AppResult<i64> {
    ensure_migrations_table(conn)?;
    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;
    Ok(v.unwrap_or(0))
}

/// Apply every migration not yet recorded, each in its own transaction.
/// Returns how many were applied.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<usize> {
    ensure_log_table(conn)?;
    ensure_migrations_table(conn)?;

    let mut applied = 0;
    for (version, name, apply) in MIGRATIONS {
        if is_applied(conn, *version)? {
            continue;
        }

        conn.execute_batch("BEGIN;")?;
        let outcome = apply(conn).and_then(|_| {
            conn.execute(
                "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
                params![version, name, chrono::Local::now().to_rfc3339()],
            )
        });

        match outcome {
            Ok(_) => conn.execute_batch("COMMIT;")?,
            Err(e) => {
                conn.execute_batch("ROLLBACK;")?;
                return Err(AppError::Migration(format!("v{version} {name}: {e}")));
            }
        }

        ttlog(
            conn,
            "migration_applied",
            &format!("v{version}"),
            &format!("Applied migration {name}"),
        )?;
        log::debug!("applied migration v{version} ({name})");
        applied += 1;
    }

    if applied > 0 {
        success(format!(
            "Database schema updated ({applied} migration(s) applied)."
        ));
    }
    Ok(applied)
}
