use super::{audit, open_client};
use crate::cli::parser::{CommentAction, Commands};
use crate::client::{Condition, Endpoint, Order, Query, SqliteClient};
use crate::config::Config;
use crate::core::annotate::AnnotatedEndpoint;
use crate::errors::AppResult;
use crate::models::{Comment, Task};
use crate::ui::messages::{header, info, success};
use crate::utils::dash;
use crate::utils::table::Table;
use chrono::Utc;
use futures::executor::block_on;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Comment { action } = cmd {
        let client = open_client(cfg)?;
        let tasks = Endpoint::<SqliteClient, Task>::new(&client);

        match action {
            CommentAction::Add { task, body } => {
                let target = block_on(tasks.detail(task))?;
                let created = block_on(Endpoint::<SqliteClient, Comment>::new(&client).insert(
                    &Comment {
                        id: String::new(),
                        task: Some(target.id.clone()),
                        user: cfg.user.clone(),
                        body: body.clone(),
                        created_at: Utc::now().to_rfc3339(),
                    },
                ))?;
                audit(&client, "add", "comment", &format!("{} on task {}", created.id, target.id));
                success(format!("Comment added to '{}'", target.name));
            }
            CommentAction::List { task } => {
                let target = block_on(tasks.detail(task))?;
                let comments: AnnotatedEndpoint<SqliteClient, Comment> =
                    AnnotatedEndpoint::new(&client, &["user"])?;
                let all = block_on(comments.query(
                    &Query::new(Condition::eq("task", target.id.as_str()))
                        .order_by("created_at", Order::Asc),
                ))?;

                header(&target.name);
                if all.is_empty() {
                    info("No comments.");
                    return Ok(());
                }
                let mut table = Table::new(&["DATE", "USER", "COMMENT"]);
                for c in &all {
                    table.add_row(vec![
                        c.created_at.clone(),
                        dash(c.annotations.label("user")),
                        c.body.clone(),
                    ]);
                }
                print!("{}", table.render());
            }
        }
    }
    Ok(())
}
