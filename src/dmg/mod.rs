//! macOS DMG disk image creation.
//!
//! Produces drag-to-install DMG files with the native hdiutil tool: the
//! volume carries the .app bundle, an Applications symlink, a styled
//! Finder window over a background image, and a composited volume icon.
//!
//! # Architecture
//!
//! This module is organized into logical submodules:
//! - `config` - Validated build configuration and derived paths
//! - `geometry` - Finder window bounds and icon placement
//! - `script` - AppleScript generation for the Finder window
//! - `builder` - The step-by-step build pipeline
//! - `icon` - Volume icon composition and attachment

mod builder;
mod config;
pub mod geometry;
mod icon;
mod script;

// Re-export the public surface of the submodules
pub use builder::{DmgBuilder, SettlePolicy};
pub use config::{DEFAULT_ICON_SIZE, DEFAULT_VOLUME_SIZE, DmgConfig, DmgConfigBuilder};
pub use icon::{apply_custom_icon, bundle_icon_path, composite_volume_icon, decode_icns};
pub use script::finder_customization_script;
