//! Narrow capabilities over the host operating system.
//!
//! The build pipeline mutates OS-global state it does not own: the mount
//! table under `/Volumes` and files in the output directory. All of that
//! access goes through two small seams, process execution and filesystem
//! access, so tests can drive the whole pipeline against fakes.

pub mod exec;
pub mod fs;

pub use exec::{CommandRunner, SystemRunner};
pub use fs::{HostFs, SystemFs};
