use super::{audit, open_client};
use crate::cli::parser::{Commands, ProjectAction};
use crate::client::{Condition, Endpoint, Order, Query, SqliteClient};
use crate::config::Config;
use crate::core::annotate::AnnotatedEndpoint;
use crate::errors::AppResult;
use crate::models::{Organization, Project};
use crate::ui::messages::{info, success};
use crate::utils::dash;
use crate::utils::table::Table;
use futures::executor::block_on;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Project { action } = cmd {
        let client = open_client(cfg)?;

        match action {
            ProjectAction::Add {
                name,
                organization,
                id,
            } => {
                if let Some(org) = organization {
                    block_on(Endpoint::<SqliteClient, Organization>::new(&client).detail(org))?;
                }
                let created = block_on(Endpoint::<SqliteClient, Project>::new(&client).insert(
                    &Project {
                        id: id.clone().unwrap_or_default(),
                        name: name.clone(),
                        organization: organization.clone(),
                        archived: false,
                    },
                ))?;
                audit(&client, "add", "project", &format!("{} {}", created.id, created.name));
                success(format!("Project '{}' created with id {}", created.name, created.id));
            }
            ProjectAction::List { organization } => {
                let condition = match organization {
                    Some(org) => Condition::eq("organization", org.as_str()),
                    None => Condition::All,
                };
                let projects: AnnotatedEndpoint<SqliteClient, Project> =
                    AnnotatedEndpoint::new(&client, &["organization"])?;
                let all = block_on(
                    projects.query(&Query::new(condition).order_by("name", Order::Asc)),
                )?;
                if all.is_empty() {
                    info("No projects.");
                    return Ok(());
                }
                let mut table = Table::new(&["ID", "NAME", "ORGANIZATION"]);
                for p in &all {
                    table.add_row(vec![
                        p.id.clone(),
                        p.name.clone(),
                        dash(p.annotations.label("organization")),
                    ]);
                }
                print!("{}", table.render());
            }
        }
    }
    Ok(())
}
