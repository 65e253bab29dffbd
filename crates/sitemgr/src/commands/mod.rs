//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
mod devices;
mod entities;
mod hosts;
mod metrics;
mod refresh;
mod sdwan;
mod sites;
mod util;
mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Route an API-backed command to its handler.
pub async fn dispatch(cmd: Command, resolved: Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Refresh => refresh::handle(&resolved, global).await,
        Command::Sites => sites::handle(&resolved, global).await,
        Command::Hosts(args) => hosts::handle(&resolved, args, global).await,
        Command::Devices(args) => devices::handle(&resolved, &args, global).await,
        Command::Metrics(args) => metrics::handle(&resolved, &args, global).await,
        Command::Sdwan => sdwan::handle(&resolved, global).await,
        Command::Entities(args) => entities::handle(&resolved, &args, global).await,
        Command::Watch(args) => watch::handle(resolved, &args, global).await,
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
