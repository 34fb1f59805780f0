//! dmgforge - Drag-to-install DMG builder for macOS apps.
//!
//! This binary packages a .app bundle into a compressed DMG with a styled
//! Finder window, with proper error reporting and optional code signing.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match dmgforge::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
