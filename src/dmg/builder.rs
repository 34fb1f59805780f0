//! The DMG build pipeline.
//!
//! One [`DmgBuilder::build`] call advances through an ordered step table:
//! validate sources, clean stale images, create and attach a writable
//! working image, populate it, arrange the Finder window, detach, compress
//! to the final read-only image, apply the volume icon, optionally sign,
//! and remove the working image.
//!
//! Steps are tagged fatal or advisory in the table itself. A fatal failure
//! aborts the build immediately with no rollback of earlier side effects
//! (a failure after attach leaves the volume mounted); the pipeline state
//! is used to warn about such leftovers so the operator can clean up.

use crate::dmg::config::DmgConfig;
use crate::dmg::{icon, script};
use crate::error::{Error, Result};
use crate::os::exec::{CommandRunner, SystemRunner};
use crate::os::fs::{HostFs, SystemFs};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;

/// Marker in `codesign --display` output proving a trusted signature chain.
const SIGNATURE_AUTHORITY_MARKER: &str = "Authority=";

/// Polling budgets for state the OS makes visible asynchronously.
///
/// Attaching an image returns before the mount point exists, and Finder
/// writes the window state to `.DS_Store` some time after the script
/// returns. Both are waited for by bounded polling; tests shrink the
/// intervals to zero to stay deterministic.
#[derive(Clone, Copy, Debug)]
pub struct SettlePolicy {
    /// Existence checks of the mount point after `hdiutil attach`.
    pub mount_attempts: u32,
    /// Pause between mount-point checks.
    pub mount_interval: Duration,
    /// Existence checks of `.DS_Store` after the Finder script.
    pub finder_attempts: u32,
    /// Pause between `.DS_Store` checks.
    pub finder_interval: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            mount_attempts: 10,
            mount_interval: Duration::from_millis(500),
            finder_attempts: 4,
            finder_interval: Duration::from_millis(500),
        }
    }
}

/// Failure class of a pipeline step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Severity {
    /// Failure aborts the build.
    Fatal,
    /// Failure is logged and the pipeline moves on.
    Advisory,
}

/// Ordered steps of one build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    CleanStale,
    CreateImage,
    Mount,
    Populate,
    Customize,
    Unmount,
    Convert,
    ApplyIcon,
    Sign,
    RemoveTemp,
}

impl Step {
    const SEQUENCE: [Step; 10] = [
        Step::CleanStale,
        Step::CreateImage,
        Step::Mount,
        Step::Populate,
        Step::Customize,
        Step::Unmount,
        Step::Convert,
        Step::ApplyIcon,
        Step::Sign,
        Step::RemoveTemp,
    ];

    fn severity(self) -> Severity {
        match self {
            Step::CleanStale | Step::ApplyIcon => Severity::Advisory,
            _ => Severity::Fatal,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Step::CleanStale => "removing stale images",
            Step::CreateImage => "creating working image",
            Step::Mount => "attaching working image",
            Step::Populate => "populating volume",
            Step::Customize => "customizing Finder window",
            Step::Unmount => "detaching volume",
            Step::Convert => "compressing final image",
            Step::ApplyIcon => "applying custom volume icon",
            Step::Sign => "signing final image",
            Step::RemoveTemp => "removing working image",
        }
    }
}

/// Side effects created so far by one build invocation.
///
/// Owned solely by [`DmgBuilder::build`]; used to name leftovers when a
/// fatal step aborts the pipeline.
#[derive(Debug, Default)]
struct PipelineState {
    temp_created: bool,
    mounted: bool,
}

/// Runs the DMG build pipeline.
///
/// The two OS seams, process execution and filesystem access, are injected
/// so tests can drive the whole pipeline against fakes.
///
/// # Examples
///
/// ```no_run
/// use dmgforge::{DmgBuilder, DmgConfig};
///
/// # async fn example() -> dmgforge::Result<()> {
/// let config = DmgConfig::builder("MyApp.app", "background.png")
///     .build()
///     .await?;
/// let dmg = DmgBuilder::new().build(&config).await?;
/// println!("created {}", dmg.display());
/// # Ok(())
/// # }
/// ```
pub struct DmgBuilder<E = SystemRunner, F = SystemFs> {
    exec: E,
    fs: F,
    settle: SettlePolicy,
}

impl DmgBuilder {
    /// Builder backed by real processes and the real filesystem.
    pub fn new() -> Self {
        Self::with_capabilities(SystemRunner, SystemFs)
    }
}

impl Default for DmgBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandRunner, F: HostFs> DmgBuilder<E, F> {
    /// Builder with injected process and filesystem capabilities.
    pub fn with_capabilities(exec: E, fs: F) -> Self {
        Self {
            exec,
            fs,
            settle: SettlePolicy::default(),
        }
    }

    /// Replaces the polling budgets used while waiting on the OS.
    pub fn settle_policy(mut self, settle: SettlePolicy) -> Self {
        self.settle = settle;
        self
    }

    /// Checks that both source paths exist.
    ///
    /// Runs before any side effect; also exposed on its own so callers can
    /// validate without building.
    pub async fn validate(&self, config: &DmgConfig) -> Result<()> {
        if !self.fs.exists(config.app_path()).await {
            return Err(Error::AppNotFound {
                path: config.app_path().to_path_buf(),
            });
        }
        if !self.fs.exists(config.background_path()).await {
            return Err(Error::BackgroundNotFound {
                path: config.background_path().to_path_buf(),
            });
        }
        Ok(())
    }

    /// Runs the full pipeline and returns the final DMG path.
    ///
    /// Fails fast on the first fatal step error; advisory steps log and
    /// continue. There is no retry and no rollback: a failure after the
    /// volume is attached leaves it mounted, and the leftovers are named
    /// in warnings instead of being cleaned up.
    pub async fn build(&self, config: &DmgConfig) -> Result<PathBuf> {
        self.validate(config).await?;

        log::info!("Creating DMG for {}", config.volume_name());

        let mut state = PipelineState::default();
        for step in Step::SEQUENCE {
            if step == Step::Sign && config.signing_identity().is_none() {
                log::debug!("no signing identity configured; skipping signature");
                continue;
            }

            match self.run_step(step, config, &mut state).await {
                Ok(()) => {}
                Err(e) if step.severity() == Severity::Advisory => {
                    log::debug!("{} skipped: {}", step.describe(), e);
                }
                Err(e) => {
                    log::error!("{} failed", step.describe());
                    self.report_leftovers(config, &state);
                    return Err(e);
                }
            }
        }

        log::info!("✓ Created {}", config.output_path().display());
        Ok(config.output_path())
    }

    async fn run_step(
        &self,
        step: Step,
        config: &DmgConfig,
        state: &mut PipelineState,
    ) -> Result<()> {
        log::debug!("{}...", step.describe());
        match step {
            Step::CleanStale => self.clean_stale(config).await,
            Step::CreateImage => {
                self.create_image(config).await?;
                state.temp_created = true;
                Ok(())
            }
            Step::Mount => {
                self.mount(config).await?;
                state.mounted = true;
                Ok(())
            }
            Step::Populate => self.populate(config).await,
            Step::Customize => self.customize(config).await,
            Step::Unmount => {
                self.unmount(config).await?;
                state.mounted = false;
                Ok(())
            }
            Step::Convert => self.convert(config).await,
            Step::ApplyIcon => {
                icon::apply_custom_icon(&self.exec, &config.output_path(), config.app_path()).await
            }
            Step::Sign => self.sign(config).await,
            Step::RemoveTemp => {
                self.fs.remove_file(&config.temp_image_path()).await?;
                state.temp_created = false;
                Ok(())
            }
        }
    }

    /// Best-effort removal of images a previous run may have left behind.
    async fn clean_stale(&self, config: &DmgConfig) -> Result<()> {
        self.fs.remove_file(&config.output_path()).await?;
        self.fs.remove_file(&config.temp_image_path()).await
    }

    /// Creates the writable working image sized ahead of time.
    async fn create_image(&self, config: &DmgConfig) -> Result<()> {
        let temp = config.temp_image_path();
        let temp = temp.to_string_lossy();
        self.exec
            .run(
                "hdiutil",
                &[
                    "create",
                    "-size",
                    config.volume_size(),
                    "-fs",
                    "APFS",
                    "-volname",
                    config.volume_name(),
                    temp.as_ref(),
                ],
            )
            .await
    }

    /// Attaches the working image and waits for its mount point to appear.
    ///
    /// `hdiutil attach` can return before the volume is visible, so the
    /// mount point is polled on the settle policy's budget.
    async fn mount(&self, config: &DmgConfig) -> Result<()> {
        let temp = config.temp_image_path();
        self.exec
            .run("hdiutil", &["attach", temp.to_string_lossy().as_ref()])
            .await?;

        let mount_point = config.mount_point();
        for attempt in 0..self.settle.mount_attempts {
            if self.fs.exists(&mount_point).await {
                log::debug!("volume mounted at {}", mount_point.display());
                return Ok(());
            }
            if attempt + 1 < self.settle.mount_attempts {
                sleep(self.settle.mount_interval).await;
            }
        }

        Err(Error::VolumeNotMounted { path: mount_point })
    }

    /// Copies the app bundle in, links /Applications, and hides the
    /// background image in a dot-directory on the volume.
    async fn populate(&self, config: &DmgConfig) -> Result<()> {
        let mount_point = config.mount_point();

        let app_dest = mount_point.join(config.app_file_name());
        self.exec
            .run(
                "cp",
                &[
                    "-R",
                    config.app_path().to_string_lossy().as_ref(),
                    app_dest.to_string_lossy().as_ref(),
                ],
            )
            .await?;

        let link = mount_point.join("Applications");
        self.exec
            .run(
                "ln",
                &["-s", "/Applications", link.to_string_lossy().as_ref()],
            )
            .await?;

        let background_dir = mount_point.join(".background");
        self.fs.create_dir_all(&background_dir).await?;
        self.fs
            .copy_file(
                config.background_path(),
                &background_dir.join(config.background_file_name()),
            )
            .await
    }

    /// Arranges the Finder window, then waits for the state to land.
    ///
    /// Finder persists the arrangement into the volume's `.DS_Store`
    /// asynchronously. The file is polled on the settle policy's budget;
    /// not seeing it is not fatal, detaching just might lose the layout.
    async fn customize(&self, config: &DmgConfig) -> Result<()> {
        let finder_script = script::finder_customization_script(
            config.volume_name(),
            config.app_file_name(),
            config.background_file_name(),
            config.icon_size(),
            config.window_bounds(),
            config.app_position(),
            config.applications_position(),
        );
        self.exec.run_script(&finder_script).await?;

        let ds_store = config.mount_point().join(".DS_Store");
        for attempt in 0..self.settle.finder_attempts {
            if self.fs.exists(&ds_store).await {
                return Ok(());
            }
            if attempt + 1 < self.settle.finder_attempts {
                sleep(self.settle.finder_interval).await;
            }
        }

        log::debug!("no .DS_Store observed at {}; continuing", ds_store.display());
        Ok(())
    }

    /// Detaches the volume.
    async fn unmount(&self, config: &DmgConfig) -> Result<()> {
        self.exec
            .run(
                "hdiutil",
                &["detach", config.mount_point().to_string_lossy().as_ref()],
            )
            .await
    }

    /// Converts the working image into the compressed read-only DMG.
    async fn convert(&self, config: &DmgConfig) -> Result<()> {
        let temp = config.temp_image_path();
        let output = config.output_path();
        self.exec
            .run(
                "hdiutil",
                &[
                    "convert",
                    temp.to_string_lossy().as_ref(),
                    "-format",
                    "UDZO",
                    "-o",
                    output.to_string_lossy().as_ref(),
                ],
            )
            .await
    }

    /// Signs the final image and verifies the signature chain.
    ///
    /// The display output must carry an `Authority=` line; a signature
    /// without one (for example ad-hoc) fails the build even though both
    /// codesign invocations exit zero.
    async fn sign(&self, config: &DmgConfig) -> Result<()> {
        let Some(identity) = config.signing_identity() else {
            return Ok(());
        };
        let output_path = config.output_path();
        let output_path = output_path.to_string_lossy();

        self.exec
            .run("codesign", &["--sign", identity, output_path.as_ref()])
            .await?;

        let display = self
            .exec
            .run_captured(
                "codesign",
                &["--display", "--verbose=2", output_path.as_ref()],
            )
            .await?;
        if !display.contains(SIGNATURE_AUTHORITY_MARKER) {
            return Err(Error::CommandFailed {
                command: format!("codesign --display --verbose=2 {}", output_path),
                output: display,
            });
        }

        log::info!("✓ Signed {} as {}", output_path, identity);
        Ok(())
    }

    /// Names anything a fatal failure left behind on the system.
    fn report_leftovers(&self, config: &DmgConfig, state: &PipelineState) {
        if state.mounted {
            log::warn!(
                "volume left mounted at {}; detach it with `hdiutil detach`",
                config.mount_point().display()
            );
        }
        if state.temp_created {
            log::warn!(
                "working image left at {}",
                config.temp_image_path().display()
            );
        }
    }
}
