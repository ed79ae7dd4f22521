use super::{audit, open_client};
use crate::cli::parser::{Commands, OrgAction};
use crate::client::{Endpoint, Order, Query, SqliteClient};
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::Organization;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;
use futures::executor::block_on;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Org { action } = cmd {
        let client = open_client(cfg)?;
        let orgs = Endpoint::<SqliteClient, Organization>::new(&client);

        match action {
            OrgAction::Add { name, id } => {
                let created = block_on(orgs.insert(&Organization {
                    id: id.clone().unwrap_or_default(),
                    name: name.clone(),
                }))?;
                audit(&client, "add", "organization", &format!("{} {}", created.id, created.name));
                success(format!("Organization '{}' created with id {}", created.name, created.id));
            }
            OrgAction::List => {
                let all = block_on(orgs.query(&Query::all().order_by("name", Order::Asc)))?;
                if all.is_empty() {
                    info("No organizations.");
                    return Ok(());
                }
                let mut table = Table::new(&["ID", "NAME"]);
                for org in all {
                    table.add_row(vec![org.id, org.name]);
                }
                print!("{}", table.render());
            }
        }
    }
    Ok(())
}
