//! Code signing identity discovery and validation.
//!
//! Identities live in the user's keychain and are enumerated with the
//! `security` tool. Validation happens before the build pipeline starts so
//! a typo in the identity name fails fast instead of after the image is
//! already built.

use crate::error::{Error, Result};
use crate::os::exec::CommandRunner;

/// Lists the code signing identities available in the keychain.
///
/// Returns the raw `security find-identity` report, one identity per line
/// plus a trailing count. Callers print it or search it; the format is
/// Apple's, not ours.
///
/// # Errors
///
/// Returns [`Error::CommandFailed`] when the `security` tool is missing or
/// exits non-zero.
pub async fn list_identities<E: CommandRunner>(exec: &E) -> Result<String> {
    exec.run_captured("security", &["find-identity", "-v", "-p", "codesigning"])
        .await
}

/// Checks that `identity` matches something in the keychain.
///
/// The match is a substring search over the identity report, so both the
/// full quoted name and the SHA-1 hash forms accepted by codesign work.
///
/// # Errors
///
/// Returns [`Error::CommandFailed`] when the identity is absent; the error
/// output carries the available identities so the caller can show them.
pub async fn validate_identity<E: CommandRunner>(exec: &E, identity: &str) -> Result<()> {
    let available = list_identities(exec).await?;
    if available.contains(identity) {
        return Ok(());
    }

    Err(Error::CommandFailed {
        command: "security find-identity".to_string(),
        output: format!(
            "signing identity {:?} not found in keychain. Available identities:\n{}",
            identity, available
        ),
    })
}
