//! Command line interface for dmgforge.
//!
//! This module wires argument parsing to the command implementations and
//! maps outcomes to process exit codes.

mod args;
pub mod commands;

pub use args::{Cli, Command, CreateArgs};

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let cli = Cli::parse_args();
    match cli.command {
        Command::Create(args) => commands::create::run(args).await,
        Command::Identities => commands::identities::run().await,
    }
}
