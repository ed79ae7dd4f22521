use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::init_db;
use crate::db::log::ttlog;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use rusqlite::Connection;

/// Handle the `init` command
///
/// Creates the config directory and file (not in test mode), then the
/// SQLite database with all pending migrations applied.
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(
        cli.db.clone(),
        cli.timers.clone(),
        cli.user.clone(),
        cli.test,
    )?;

    let db_path = cfg.database_path();

    println!("⚙️  Initializing rworklog…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database    : {db_path}");
    println!("⏱️  Timers      : {}", cfg.timers_path().display());

    let conn = Connection::open(&db_path)?;
    init_db(&conn)?;

    if let Err(e) = ttlog(
        &conn,
        "init",
        "",
        &format!("Database initialized at {db_path}"),
    ) {
        warning(format!("Failed to write internal log: {e}"));
    }

    success(format!("Database initialized at {db_path}"));
    Ok(())
}
