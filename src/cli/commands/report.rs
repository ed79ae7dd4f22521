use super::open_client;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::report::ReportLogic;
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::date::range_condition;
use crate::utils::format_seconds;
use crate::utils::table::Table;
use futures::executor::block_on;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report { by, range } = cmd {
        let client = open_client(cfg)?;
        let filter = range_condition(range, "date")?;
        let rows = block_on(ReportLogic::totals(&client, *by, &filter))?;

        header(format!(
            "Tracked time by {}{}",
            by.field(),
            range.as_deref().map(|r| format!(" ({r})")).unwrap_or_default()
        ));
        if rows.is_empty() {
            info("No time entries.");
            return Ok(());
        }

        let total: u64 = rows.iter().map(|r| r.seconds).sum();
        let dimension = by.field().to_uppercase();
        let mut table = Table::new(&[dimension.as_str(), "DURATION"]);
        for row in &rows {
            table.add_row(vec![row.label.clone(), format_seconds(row.seconds)]);
        }
        table.add_row(vec!["TOTAL".to_string(), format_seconds(total)]);
        print!("{}", table.render());
    }
    Ok(())
}
