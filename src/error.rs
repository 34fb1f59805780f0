//! Error types for DMG building.
//!
//! Every failure, from a missing source bundle to a failed external command,
//! funnels into a single error enum that carries enough captured context to
//! diagnose the build without re-running it.

use std::path::PathBuf;

/// Result type alias for DMG operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for all DMG operations.
///
/// Every variant is terminal for the current build; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The application bundle path does not exist on disk
    #[error("app bundle not found at path: {}", .path.display())]
    AppNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// The background image path does not exist or is not a readable image
    #[error("background image not found at path: {}", .path.display())]
    BackgroundNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// The attached disk image never became visible at its mount point
    #[error("volume not mounted at path: {}", .path.display())]
    VolumeNotMounted {
        /// Expected mount point
        path: PathBuf,
    },

    /// An external command exited non-zero or could not be launched
    #[error("command failed: {command}\n{output}")]
    CommandFailed {
        /// Rendered command line that was run
        command: String,
        /// Combined stdout and stderr captured from the process
        output: String,
    },

    /// The Finder customization script failed
    #[error("AppleScript failed: {output}")]
    ScriptFailed {
        /// Combined output from the scripting host
        output: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
