//! Command handlers and the top-level dispatcher.

pub mod account;
pub mod climate;
pub mod config_cmd;
pub mod devices;
pub mod entities;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    tracing::debug!(command = ?cmd, "dispatching command");
    match cmd {
        // Config commands don't need a cloud session
        Command::Config(args) => config_cmd::handle(args, global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = crate::cli::Cli::command();
            generate(args.shell, &mut cmd, "poolside", &mut std::io::stdout());
            Ok(())
        }

        Command::Account => account::handle(global).await,
        Command::Devices(args) => devices::handle(args, global).await,
        Command::Entities(args) => entities::handle(args, global).await,
        Command::Climate(args) => climate::handle(args, global).await,
        Command::Watch(args) => watch::handle(args, global).await,
    }
}
