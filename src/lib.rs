//! DMG creation library for macOS drag-to-install installers
//!
//! This library builds polished DMG disk images from a .app bundle and a
//! background picture: the volume opens in a styled Finder window with the
//! app on the left, an Applications symlink on the right, and a composited
//! volume icon, optionally code signed.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod dmg;
pub mod error;
pub mod os;
pub mod signing;

// Re-export commonly used types
pub use dmg::{DmgBuilder, DmgConfig, DmgConfigBuilder, SettlePolicy};
pub use error::{Error, Result};
