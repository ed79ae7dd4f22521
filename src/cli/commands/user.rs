use super::{audit, open_client};
use crate::cli::parser::{Commands, UserAction};
use crate::client::{Endpoint, Order, Query, SqliteClient};
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::User;
use crate::ui::messages::{info, success};
use crate::utils::dash;
use crate::utils::table::Table;
use futures::executor::block_on;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::User { action } = cmd {
        let client = open_client(cfg)?;
        let users = Endpoint::<SqliteClient, User>::new(&client);

        match action {
            UserAction::Add { name, email, id } => {
                let created = block_on(users.insert(&User {
                    id: id.clone().unwrap_or_default(),
                    name: name.clone(),
                    email: email.clone(),
                }))?;
                audit(&client, "add", "user", &format!("{} {}", created.id, created.name));
                success(format!("User '{}' created with id {}", created.name, created.id));
            }
            UserAction::List => {
                let all = block_on(users.query(&Query::all().order_by("name", Order::Asc)))?;
                if all.is_empty() {
                    info("No users.");
                    return Ok(());
                }
                let mut table = Table::new(&["ID", "NAME", "EMAIL"]);
                for user in all {
                    table.add_row(vec![user.id, user.name, dash(user.email.as_deref())]);
                }
                print!("{}", table.render());
            }
        }
    }
    Ok(())
}
