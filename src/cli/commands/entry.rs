use super::{audit, open_client};
use crate::cli::parser::{Commands, EntryAction};
use crate::client::{Condition, Endpoint, Order, Query, SqliteClient};
use crate::config::Config;
use crate::core::annotate::AnnotatedEndpoint;
use crate::errors::{AppError, AppResult};
use crate::models::{Project, TimeEntry};
use crate::ui::messages::{info, success};
use crate::utils::date::{parse_date, range_condition, today};
use crate::utils::table::Table;
use crate::utils::time::parse_duration;
use crate::utils::{dash, format_seconds, truncate};
use futures::executor::block_on;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Entry { action } = cmd {
        let client = open_client(cfg)?;
        let entries = Endpoint::<SqliteClient, TimeEntry>::new(&client);

        match action {
            EntryAction::Add {
                project,
                duration,
                task,
                summary,
                date,
                id,
            } => {
                let date = match date {
                    Some(d) => parse_date(d).ok_or_else(|| AppError::InvalidDate(d.clone()))?,
                    None => today(),
                };
                let seconds = parse_duration(duration)?;
                block_on(Endpoint::<SqliteClient, Project>::new(&client).detail(project))?;

                let created = block_on(entries.insert(&TimeEntry {
                    id: id.clone().unwrap_or_default(),
                    task: task.clone(),
                    project: Some(project.clone()),
                    user: cfg.user.clone(),
                    summary: summary.clone(),
                    date,
                    duration: i64::try_from(seconds)
                        .map_err(|_| AppError::InvalidDuration(duration.clone()))?,
                }))?;
                audit(
                    &client,
                    "add",
                    "time_entry",
                    &format!("{} {} {}s", created.id, created.date, created.duration),
                );
                success(format!(
                    "Entry {} recorded: {} on {}",
                    created.id,
                    format_seconds(seconds),
                    created.date
                ));
            }
            EntryAction::List { range, project } => {
                let mut condition = range_condition(range, "date")?;
                if let Some(p) = project {
                    condition = condition.and(Condition::eq("project", p.as_str()));
                }
                list(&client, condition)?;
            }
            EntryAction::Del { id } => {
                block_on(entries.delete(id))?;
                audit(&client, "del", "time_entry", id);
                success(format!("Entry {id} deleted"));
            }
        }
    }
    Ok(())
}

fn list(client: &SqliteClient, condition: Condition) -> AppResult<()> {
    let entries: AnnotatedEndpoint<SqliteClient, TimeEntry> =
        AnnotatedEndpoint::new(client, &["project", "task", "user"])?;
    let all = block_on(entries.query(&Query::new(condition).order_by("date", Order::Asc)))?;
    if all.is_empty() {
        info("No time entries.");
        return Ok(());
    }

    let mut total: u64 = 0;
    let mut table = Table::new(&["ID", "DATE", "PROJECT", "TASK", "USER", "DURATION", "SUMMARY"]);
    for e in &all {
        let secs = e.duration.max(0) as u64;
        total += secs;
        table.add_row(vec![
            e.id.clone(),
            e.date.to_string(),
            dash(e.annotations.label("project")),
            dash(e.annotations.label("task")),
            dash(e.annotations.label("user")),
            format_seconds(secs),
            truncate(&e.summary, 40),
        ]);
    }
    print!("{}", table.render());
    println!("\nTotal: {}", format_seconds(total));
    Ok(())
}
