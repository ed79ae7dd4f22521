use super::{audit, open_client};
use crate::cli::parser::{Commands, TaskAction};
use crate::client::{Condition, Endpoint, Order, Query, Record, SqliteClient};
use crate::config::Config;
use crate::core::annotate::AnnotatedEndpoint;
use crate::core::report::ReportLogic;
use crate::errors::AppResult;
use crate::models::{Project, Task, TaskStatus, User};
use crate::ui::messages::{info, success};
use crate::utils::table::Table;
use crate::utils::{dash, format_seconds};
use futures::executor::block_on;
use serde_json::Value;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Task { action } = cmd {
        let client = open_client(cfg)?;
        let tasks = Endpoint::<SqliteClient, Task>::new(&client);

        match action {
            TaskAction::Add {
                name,
                project,
                assignee,
                id,
            } => {
                if let Some(p) = project {
                    block_on(Endpoint::<SqliteClient, Project>::new(&client).detail(p))?;
                }
                if let Some(u) = assignee {
                    block_on(Endpoint::<SqliteClient, User>::new(&client).detail(u))?;
                }
                let created = block_on(tasks.insert(&Task {
                    id: id.clone().unwrap_or_default(),
                    name: name.clone(),
                    project: project.clone(),
                    user: assignee.clone(),
                    status: TaskStatus::Todo,
                }))?;
                audit(&client, "add", "task", &format!("{} {}", created.id, created.name));
                success(format!("Task '{}' created with id {}", created.name, created.id));
            }
            TaskAction::List { project } => list(&client, project)?,
            TaskAction::Done { id } => {
                let mut changes = Record::new();
                changes.insert(
                    "status".to_string(),
                    Value::from(TaskStatus::Done.as_str()),
                );
                let task = block_on(tasks.modify(id, changes))?;
                audit(&client, "done", "task", &task.id);
                success(format!("Task '{}' marked as done", task.name));
            }
            TaskAction::Del { id } => {
                block_on(tasks.delete(id))?;
                audit(&client, "del", "task", id);
                success(format!("Task {id} deleted"));
            }
        }
    }
    Ok(())
}

fn list(client: &SqliteClient, project: &Option<String>) -> AppResult<()> {
    let condition = match project {
        Some(p) => Condition::eq("project", p.as_str()),
        None => Condition::All,
    };
    let tasks: AnnotatedEndpoint<SqliteClient, Task> =
        AnnotatedEndpoint::new(client, &["project", "user"])?;
    let all = block_on(tasks.query(&Query::new(condition).order_by("name", Order::Asc)))?;
    if all.is_empty() {
        info("No tasks.");
        return Ok(());
    }

    let ids: Vec<String> = all.iter().map(|t| t.id.clone()).collect();
    let tracked = block_on(ReportLogic::task_totals(client, &ids))?;

    let mut table = Table::new(&["ID", "NAME", "STATUS", "PROJECT", "ASSIGNEE", "TRACKED"]);
    for t in &all {
        table.add_row(vec![
            t.id.clone(),
            t.name.clone(),
            t.status.to_string(),
            dash(t.annotations.label("project")),
            dash(t.annotations.label("user")),
            format_seconds(tracked.get(&t.id).copied().unwrap_or(0)),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}
