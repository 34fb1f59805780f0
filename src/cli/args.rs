//! Command line argument parsing.
//!
//! This module defines the CLI surface using clap, with one subcommand per
//! operation and environment fallbacks where automation needs them.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Drag-to-install DMG builder for macOS apps
#[derive(Parser, Debug)]
#[command(
    name = "dmgforge",
    version,
    about = "Drag-to-install DMG builder for macOS apps",
    long_about = "Builds polished drag-to-install DMG images from a .app bundle and a
background picture, using the native hdiutil and Finder tooling.

Usage:
  dmgforge create MyApp.app background.png
  dmgforge create MyApp.app background.png --volume-name \"My App 2.0\" --sign \"Developer ID Application: ...\"
  dmgforge identities

Exit code 0 = the DMG exists at the reported path."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level operations
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a DMG from an app bundle and a background image
    Create(CreateArgs),
    /// List the code signing identities available in the keychain
    Identities,
}

/// Arguments for `dmgforge create`
#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Path to the .app bundle to package
    #[arg(value_name = "APP")]
    pub app: PathBuf,

    /// Path to the background image (its dimensions size the Finder window)
    #[arg(value_name = "BACKGROUND")]
    pub background: PathBuf,

    /// Directory the DMG is written to (defaults to the working directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Volume name (defaults to the app bundle name without .app)
    #[arg(long, value_name = "NAME")]
    pub volume_name: Option<String>,

    /// Size of the working image, in hdiutil notation
    #[arg(long, value_name = "SIZE", default_value = crate::dmg::DEFAULT_VOLUME_SIZE)]
    pub volume_size: String,

    /// Finder icon size on the volume
    #[arg(long, value_name = "PIXELS", default_value_t = crate::dmg::DEFAULT_ICON_SIZE)]
    pub icon_size: u32,

    /// Code signing identity; the DMG is signed and verified when set
    #[arg(long, value_name = "IDENTITY", env = "DMGFORGE_SIGN")]
    pub sign: Option<String>,

    /// Print the resolved configuration before building
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
