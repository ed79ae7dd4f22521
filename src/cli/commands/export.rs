use super::{audit, open_client};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::export::ExportLogic;
use crate::errors::AppResult;
use crate::utils::path::expand_tilde;
use futures::executor::block_on;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        range,
        force,
    } = cmd
    {
        let client = open_client(cfg)?;
        let path = expand_tilde(file);
        let count = block_on(ExportLogic::export(&client, *format, &path, range, *force))?;
        audit(
            &client,
            "export",
            format.as_str(),
            &format!("{count} entries → {}", path.display()),
        );
    }
    Ok(())
}
