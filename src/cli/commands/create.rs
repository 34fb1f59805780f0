//! The `create` subcommand: build a DMG from CLI arguments.

use crate::cli::CreateArgs;
use crate::dmg::{DmgBuilder, DmgConfig};
use crate::error::Result;
use crate::os::exec::SystemRunner;
use crate::signing;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Builds a DMG from the parsed arguments.
///
/// The signing identity is validated against the keychain before any work
/// starts, so a bad `--sign` value fails before an image is built.
pub async fn run(args: CreateArgs) -> Result<i32> {
    if let Some(identity) = &args.sign {
        signing::validate_identity(&SystemRunner, identity).await?;
    }

    let mut builder = DmgConfig::builder(args.app, args.background)
        .volume_size(args.volume_size)
        .icon_size(args.icon_size);
    if let Some(name) = args.volume_name {
        builder = builder.volume_name(name);
    }
    if let Some(dir) = args.output {
        builder = builder.output_dir(dir);
    }
    if let Some(identity) = args.sign {
        builder = builder.signing_identity(identity);
    }
    let config = builder.build().await?;

    if args.verbose {
        print_configuration(&config);
    }

    println!("Creating DMG for {}...", config.volume_name());
    let dmg_path = DmgBuilder::new().build(&config).await?;

    let checksum = file_sha256(&dmg_path).await?;
    log::info!("sha256 {}", checksum);

    println!("✓ Successfully created {}", dmg_path.display());
    Ok(0)
}

/// Prints the resolved configuration, derived values included.
fn print_configuration(config: &DmgConfig) {
    let bounds = config.window_bounds();
    let app = config.app_position();
    let applications = config.applications_position();

    println!("Volume name:    {}", config.volume_name());
    println!("App bundle:     {}", config.app_path().display());
    println!("Background:     {}", config.background_path().display());
    println!("Output:         {}", config.output_path().display());
    println!("Volume size:    {}", config.volume_size());
    println!("Icon size:      {}", config.icon_size());
    println!(
        "Window bounds:  {{{}, {}, {}, {}}}",
        bounds.x, bounds.y, bounds.width, bounds.height
    );
    println!("App at:         {{{}, {}}}", app.x, app.y);
    println!(
        "Applications:   {{{}, {}}}",
        applications.x, applications.y
    );
    match config.signing_identity() {
        Some(identity) => println!("Signing as:     {}", identity),
        None => println!("Signing:        disabled"),
    }
}

/// SHA-256 of the finished image, hex encoded.
///
/// Reads in 8KB chunks to handle large images efficiently.
async fn file_sha256(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
