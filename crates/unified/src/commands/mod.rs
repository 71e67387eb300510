//! Command dispatch: bridges CLI args -> API calls -> output formatting.

pub mod config_cmd;
pub mod network;
pub mod protect;
pub mod subscribe;
pub mod util;

use unified_api::Client;

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;

/// Dispatch a console-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, client: &Client, format: OutputFormat) -> Result<(), CliError> {
    match cmd {
        Command::Network(args) => network::handle(args, client, format).await,
        Command::Protect(args) => protect::handle(args, client, format).await,
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
