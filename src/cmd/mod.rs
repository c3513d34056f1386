//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! handler: [`track`] for the default one-shot lookup, [`serve`] for
//! the relay server. Invoking the binary with no tracking numbers (or
//! with the hidden French `--aide` alias) prints the help text and
//! exits successfully.

pub mod serve;
pub mod track;

use clap::CommandFactory;

use crate::cli::{Cli, Commands};
use crate::error::FacteurError;

pub async fn dispatch(cli: Cli) -> Result<(), FacteurError> {
    match cli.command {
        Some(Commands::Serve(args)) => serve::execute(args).await,
        None => {
            if cli.track.aide || cli.tracking_numbers.is_empty() {
                return print_help();
            }
            track::execute(&cli.tracking_numbers, &cli.track).await
        }
    }
}

fn print_help() -> Result<(), FacteurError> {
    let mut cmd = Cli::command();
    cmd.print_help()?;
    Ok(())
}
