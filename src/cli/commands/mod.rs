//! Command implementations for the CLI subcommands.

pub mod create;
pub mod identities;
