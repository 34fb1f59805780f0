//! External process execution.
//!
//! The pipeline drives `hdiutil`, `osascript`, `cp`, `ln`, `codesign` and
//! `security` as child processes, judged by exit status. Both output streams
//! are captured and combined so a failure carries everything the process
//! said. No timeout wraps a command: a hung external process hangs the
//! build.

use crate::error::{Error, Result};
use tokio::process::Command;

/// Scripting host used for Finder customization.
const SCRIPT_HOST: &str = "osascript";

/// Process-execution capability used by the build pipeline.
///
/// One command value (program, ordered arguments, captured output, exit
/// status) is constructed and discarded per invocation; implementations
/// share no state between calls.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Runs `program` with `args`, discarding the output on success.
    ///
    /// # Errors
    ///
    /// [`Error::CommandFailed`] when the process exits non-zero or cannot
    /// be launched, carrying the rendered command line and the combined
    /// stdout/stderr.
    async fn run(&self, program: &str, args: &[&str]) -> Result<()>;

    /// Runs `program` with `args` and returns the combined stdout/stderr.
    ///
    /// Same failure contract as [`CommandRunner::run`]; used where the
    /// output matters even on success (signature display, keychain
    /// listing).
    async fn run_captured(&self, program: &str, args: &[&str]) -> Result<String>;

    /// Executes a script through the OS scripting host.
    ///
    /// # Errors
    ///
    /// [`Error::ScriptFailed`] with the combined output when the host
    /// exits non-zero or cannot be launched.
    async fn run_script(&self, script: &str) -> Result<()>;
}

/// [`CommandRunner`] backed by real child processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<()> {
        self.run_captured(program, args).await.map(drop)
    }

    async fn run_captured(&self, program: &str, args: &[&str]) -> Result<String> {
        let command = render_command_line(program, args);
        log::debug!("Running: {}", command);

        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::CommandFailed {
                command: command.clone(),
                output: format!("failed to launch: {}", e),
            })?;

        let combined = combine_output(&output.stdout, &output.stderr);
        if !output.status.success() {
            return Err(Error::CommandFailed {
                command,
                output: combined,
            });
        }

        Ok(combined)
    }

    async fn run_script(&self, script: &str) -> Result<()> {
        log::debug!("Running {} script ({} bytes)", SCRIPT_HOST, script.len());

        let output = Command::new(SCRIPT_HOST)
            .arg("-e")
            .arg(script)
            .output()
            .await
            .map_err(|e| Error::ScriptFailed {
                output: format!("failed to launch {}: {}", SCRIPT_HOST, e),
            })?;

        if !output.status.success() {
            return Err(Error::ScriptFailed {
                output: combine_output(&output.stdout, &output.stderr),
            });
        }

        Ok(())
    }
}

/// Renders a command line for error messages and logs.
fn render_command_line(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Combines captured stdout and stderr into one diagnostic string.
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(stderr));
    combined
}
