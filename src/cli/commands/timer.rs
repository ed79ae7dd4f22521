use super::{audit, open_client, open_timers};
use crate::cli::parser::{Commands, TimerAction};
use crate::client::{Endpoint, SqliteClient};
use crate::config::Config;
use crate::core::annotate::Annotator;
use crate::core::timer::{NewTimer, TimerManager, TimerUpdate};
use crate::errors::{AppError, AppResult};
use crate::models::{Task, Timer, TimerState};
use crate::ui::messages::{error, info, success, warning};
use crate::utils::table::Table;
use crate::utils::time::parse_duration;
use crate::utils::{dash, format_seconds, truncate};
use futures::executor::block_on;

fn state_label(state: TimerState) -> &'static str {
    match state {
        TimerState::Running => "running",
        TimerState::Paused => "paused",
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let result = run(cmd, cfg);
    // An unknown key means the caller's view of the registry is stale.
    if let Err(AppError::TimerNotFound(key)) = &result {
        error(format!(
            "No timer '{key}' in the registry; run `rworklog timer list` to see current keys"
        ));
    }
    result
}

fn run(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Timer { action } = cmd {
        let client = open_client(cfg)?;
        let mut timers = open_timers(cfg)?;

        match action {
            TimerAction::Start {
                task,
                project,
                summary,
                key,
            } => start(&client, &mut timers, task, project, summary, key)?,
            TimerAction::Toggle { key } => {
                let state = timers.toggle(key)?;
                audit(&client, "toggle", "timer", &format!("{key} {}", state_label(state)));
                success(format!(
                    "Timer '{key}' {} at {}",
                    state_label(state),
                    format_seconds(timers.elapsed(key)?)
                ));
            }
            TimerAction::Update {
                key,
                summary,
                task,
                project,
                elapsed,
                stop,
            } => {
                let mut changes = TimerUpdate {
                    summary: summary.clone(),
                    task: task.clone().map(Some),
                    project: project.clone().map(Some),
                    ..TimerUpdate::default()
                };
                if let Some(d) = elapsed {
                    changes.accumulated_seconds = Some(parse_duration(d)?);
                    // Restart the running interval so the new value is exact.
                    if timers.get(key)?.is_running() {
                        changes.last_started = Some(Some(timers.now()));
                    }
                }
                if *stop {
                    changes.last_started = Some(None);
                }
                timers.update(key, changes)?;
                audit(&client, "update", "timer", key);
                success(format!("Timer '{key}' updated"));
            }
            TimerAction::Rm { key } => {
                timers.remove(key)?;
                audit(&client, "remove", "timer", key);
                success(format!("Timer '{key}' removed"));
            }
            TimerAction::Submit { key } => {
                let entry = block_on(timers.submit(key, &client))?;
                audit(
                    &client,
                    "submit",
                    "timer",
                    &format!("{key} → entry {} ({}s)", entry.id, entry.duration),
                );
                success(format!(
                    "Timer '{key}' submitted as entry {} ({})",
                    entry.id,
                    format_seconds(entry.duration.max(0) as u64)
                ));
            }
            TimerAction::List => list(&client, &timers)?,
        }
    }
    Ok(())
}

fn start(
    client: &SqliteClient,
    timers: &mut TimerManager,
    task: &Option<String>,
    project: &Option<String>,
    summary: &str,
    key: &Option<String>,
) -> AppResult<()> {
    if let Some(task_id) = task
        && let Some(existing) = timers.timer_for_task(task_id).map(str::to_string)
    {
        let ignored: Vec<&str> = [
            ("--key", key.is_some()),
            ("--project", project.is_some()),
            ("--summary", !summary.is_empty()),
        ]
        .into_iter()
        .filter_map(|(flag, given)| given.then_some(flag))
        .collect();
        if !ignored.is_empty() {
            warning(format!(
                "Ignoring {} for existing timer '{existing}'; use `rworklog timer update` to change it",
                ignored.join(", ")
            ));
        }

        if timers.get(&existing)?.is_running() {
            info(format!("Timer '{existing}' is already running for task {task_id}"));
        } else {
            timers.toggle(&existing)?;
            audit(client, "toggle", "timer", &format!("{existing} running"));
            success(format!("Timer '{existing}' resumed"));
        }
        return Ok(());
    }

    // A task carries its project unless one is given explicitly.
    let project = match (project, task) {
        (Some(p), _) => Some(p.clone()),
        (None, Some(t)) => block_on(Endpoint::<SqliteClient, Task>::new(client).detail(t))?.project,
        (None, None) => None,
    };

    let key = timers.new_timer(NewTimer {
        key: key.clone(),
        task: task.clone(),
        project,
        summary: summary.to_string(),
    })?;
    audit(client, "start", "timer", &key);
    success(format!("Timer '{key}' started"));
    Ok(())
}

fn list(client: &SqliteClient, timers: &TimerManager) -> AppResult<()> {
    if timers.is_empty() {
        info("No timers.");
        return Ok(());
    }

    let (keys, items): (Vec<String>, Vec<Timer>) = timers
        .timers()
        .map(|(k, t)| (k.to_string(), t.clone()))
        .unzip();
    let annotated = block_on(Annotator::<Timer>::new(&["task", "project"])?.annotate(client, items))?;

    let now = timers.now();
    let mut table = Table::new(&["KEY", "STATE", "ELAPSED", "TASK", "PROJECT", "SUMMARY"]);
    for (key, t) in keys.into_iter().zip(&annotated) {
        table.add_row(vec![
            key,
            state_label(t.state()).to_string(),
            format_seconds(t.elapsed_at(now)),
            dash(t.annotations.label("task")),
            dash(t.annotations.label("project")),
            truncate(&t.summary, 40),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}
