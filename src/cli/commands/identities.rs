//! The `identities` subcommand: list keychain signing identities.

use crate::error::Result;
use crate::os::exec::SystemRunner;
use crate::signing;

/// Prints the code signing identities usable with `create --sign`.
pub async fn run() -> Result<i32> {
    let report = signing::list_identities(&SystemRunner).await?;

    if report.trim().is_empty() || report.contains("0 valid identities found") {
        println!("No code signing identities found in keychain.");
        println!("Install a Developer ID Application certificate to sign images.");
    } else {
        println!("Available code signing identities:");
        println!("{}", report.trim_end());
    }

    Ok(0)
}
