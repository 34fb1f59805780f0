#![allow(dead_code)]

use dmgforge::SettlePolicy;
use dmgforge::error::{Error, Result};
use dmgforge::os::{CommandRunner, HostFs};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded call against the fake runner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Run { program: String, args: Vec<String> },
    Script { script: String },
}

/// CommandRunner fake that records every call.
///
/// Clones share the call log, so tests keep one handle and move the other
/// into the builder. Failures and captured output are configured up front.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_when: Option<FailRule>,
    fail_scripts: bool,
    captured: HashMap<String, String>,
}

#[derive(Clone)]
struct FailRule {
    program: String,
    first_arg: String,
    output: String,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails any call whose program and first argument match.
    pub fn fail_matching(mut self, program: &str, first_arg: &str, output: &str) -> Self {
        self.fail_when = Some(FailRule {
            program: program.to_string(),
            first_arg: first_arg.to_string(),
            output: output.to_string(),
        });
        self
    }

    /// Fails every script execution.
    pub fn fail_scripts(mut self) -> Self {
        self.fail_scripts = true;
        self
    }

    /// Sets the output `run_captured` returns for `program`.
    pub fn captured_output(mut self, program: &str, output: &str) -> Self {
        self.captured.insert(program.to_string(), output.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("call log").clone()
    }

    /// Recorded non-script calls rendered as command lines.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Run { program, args } => Some(if args.is_empty() {
                    program
                } else {
                    format!("{} {}", program, args.join(" "))
                }),
                Call::Script { .. } => None,
            })
            .collect()
    }

    /// Recorded scripts, in order.
    pub fn scripts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Script { script } => Some(script),
                Call::Run { .. } => None,
            })
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<()> {
        self.run_captured(program, args).await.map(drop)
    }

    async fn run_captured(&self, program: &str, args: &[&str]) -> Result<String> {
        self.calls.lock().expect("call log").push(Call::Run {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        });

        if let Some(rule) = &self.fail_when {
            if program == rule.program && args.first() == Some(&rule.first_arg.as_str()) {
                return Err(Error::CommandFailed {
                    command: format!("{} {}", program, args.join(" ")),
                    output: rule.output.clone(),
                });
            }
        }

        Ok(self.captured.get(program).cloned().unwrap_or_default())
    }

    async fn run_script(&self, script: &str) -> Result<()> {
        self.calls.lock().expect("call log").push(Call::Script {
            script: script.to_string(),
        });

        if self.fail_scripts {
            return Err(Error::ScriptFailed {
                output: "script refused".to_string(),
            });
        }

        Ok(())
    }
}

/// One recorded mutation against the fake filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FsOp {
    RemoveFile(PathBuf),
    CreateDirAll(PathBuf),
    CopyFile { from: PathBuf, to: PathBuf },
}

/// HostFs fake over an in-memory path set.
///
/// Clones share state, same as [`RecordingRunner`].
#[derive(Clone, Default)]
pub struct FakeHost {
    present: Arc<Mutex<HashSet<PathBuf>>>,
    ops: Arc<Mutex<Vec<FsOp>>>,
    fail_removals: HashSet<PathBuf>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths<I>(paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        let host = Self::new();
        for path in paths {
            host.insert(path.into());
        }
        host
    }

    /// Fails every `remove_file` of `path`.
    pub fn fail_removal(mut self, path: &Path) -> Self {
        self.fail_removals.insert(path.to_path_buf());
        self
    }

    pub fn insert(&self, path: PathBuf) {
        self.present.lock().expect("path set").insert(path);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.present.lock().expect("path set").contains(path)
    }

    pub fn ops(&self) -> Vec<FsOp> {
        self.ops.lock().expect("op log").clone()
    }
}

impl HostFs for FakeHost {
    async fn exists(&self, path: &Path) -> bool {
        self.contains(path)
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        self.ops
            .lock()
            .expect("op log")
            .push(FsOp::RemoveFile(path.to_path_buf()));

        if self.fail_removals.contains(path) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot remove {}", path.display()),
            )));
        }

        self.present.lock().expect("path set").remove(path);
        Ok(())
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.ops
            .lock()
            .expect("op log")
            .push(FsOp::CreateDirAll(path.to_path_buf()));
        self.insert(path.to_path_buf());
        Ok(())
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        self.ops.lock().expect("op log").push(FsOp::CopyFile {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        self.insert(to.to_path_buf());
        Ok(())
    }
}

/// Writes a minimal app bundle and a real PNG background under `dir`.
///
/// Returns the bundle path and the background path.
pub fn make_fixtures(dir: &Path, width: u32, height: u32) -> (PathBuf, PathBuf) {
    let app = dir.join("TestApp.app");
    fs::create_dir_all(app.join("Contents")).expect("create app bundle");

    let background = dir.join("background.png");
    image::RgbaImage::new(width, height)
        .save(&background)
        .expect("write background png");

    (app, background)
}

/// Settle policy that never sleeps, for deterministic pipeline tests.
pub fn instant_settle() -> SettlePolicy {
    SettlePolicy {
        mount_attempts: 3,
        mount_interval: Duration::ZERO,
        finder_attempts: 2,
        finder_interval: Duration::ZERO,
    }
}
