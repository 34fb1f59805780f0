//! Immutable configuration for a single DMG build.
//!
//! A [`DmgConfig`] is assembled once through [`DmgConfigBuilder`], validated
//! against the filesystem during construction, and never mutated afterwards.
//! Everything derived from it (output paths, mount point) is recomputed from
//! the same immutable fields, so it can never go stale.

use crate::dmg::geometry::{self, IconPosition, WindowBounds};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Default volume capacity requested from hdiutil.
pub const DEFAULT_VOLUME_SIZE: &str = "200m";

/// Default Finder icon size inside the DMG window.
pub const DEFAULT_ICON_SIZE: u32 = 100;

/// Validated, immutable settings for one build.
///
/// # Examples
///
/// ```no_run
/// use dmgforge::DmgConfig;
///
/// # async fn example() -> dmgforge::Result<()> {
/// let config = DmgConfig::builder("target/MyApp.app", "assets/background.png")
///     .output_dir("target/dist")
///     .icon_size(128)
///     .build()
///     .await?;
///
/// assert!(config.output_path().ends_with("MyApp.dmg"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct DmgConfig {
    volume_name: String,
    app_path: PathBuf,
    app_file_name: String,
    background_path: PathBuf,
    background_file_name: String,
    output_dir: PathBuf,
    volume_size: String,
    icon_size: u32,
    window_bounds: WindowBounds,
    app_position: IconPosition,
    applications_position: IconPosition,
    signing_identity: Option<String>,
}

impl DmgConfig {
    /// Starts building a configuration for the given app bundle and
    /// background image.
    pub fn builder<A, B>(app_path: A, background_path: B) -> DmgConfigBuilder
    where
        A: Into<PathBuf>,
        B: Into<PathBuf>,
    {
        DmgConfigBuilder::new(app_path.into(), background_path.into())
    }

    /// Volume name, shown in Finder's sidebar and window title.
    pub fn volume_name(&self) -> &str {
        &self.volume_name
    }

    /// Path to the source `.app` bundle.
    pub fn app_path(&self) -> &Path {
        &self.app_path
    }

    /// File name of the app bundle, e.g. `MyApp.app`.
    pub fn app_file_name(&self) -> &str {
        &self.app_file_name
    }

    /// Path to the background image.
    pub fn background_path(&self) -> &Path {
        &self.background_path
    }

    /// File name of the background image, e.g. `background.png`.
    pub fn background_file_name(&self) -> &str {
        &self.background_file_name
    }

    /// Directory the final DMG is written into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Volume capacity passed to `hdiutil create -size`.
    pub fn volume_size(&self) -> &str {
        &self.volume_size
    }

    /// Finder icon size inside the DMG window.
    pub fn icon_size(&self) -> u32 {
        self.icon_size
    }

    /// Bounds of the Finder window.
    pub fn window_bounds(&self) -> WindowBounds {
        self.window_bounds
    }

    /// Position of the app icon inside the window.
    pub fn app_position(&self) -> IconPosition {
        self.app_position
    }

    /// Position of the Applications shortcut inside the window.
    pub fn applications_position(&self) -> IconPosition {
        self.applications_position
    }

    /// Code-signing identity, when the final image should be signed.
    pub fn signing_identity(&self) -> Option<&str> {
        self.signing_identity.as_deref()
    }

    /// Path of the final DMG: `{output_dir}/{volume_name}.dmg`.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.dmg", self.volume_name))
    }

    /// Path of the writable working image: `{output_dir}/{volume_name}-temp.dmg`.
    pub fn temp_image_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}-temp.dmg", self.volume_name))
    }

    /// Where the working image mounts: `/Volumes/{volume_name}`.
    pub fn mount_point(&self) -> PathBuf {
        PathBuf::from(format!("/Volumes/{}", self.volume_name))
    }
}

/// Builder for constructing [`DmgConfig`].
///
/// Anything not set explicitly falls back to a default: the volume name
/// comes from the app bundle's file name, the output directory is the
/// current directory, and the window layout is derived from the background
/// image's pixel dimensions by [`crate::dmg::geometry`].
pub struct DmgConfigBuilder {
    app_path: PathBuf,
    background_path: PathBuf,
    volume_name: Option<String>,
    output_dir: Option<PathBuf>,
    volume_size: String,
    icon_size: u32,
    window_bounds: Option<WindowBounds>,
    app_position: Option<IconPosition>,
    applications_position: Option<IconPosition>,
    signing_identity: Option<String>,
}

impl DmgConfigBuilder {
    fn new(app_path: PathBuf, background_path: PathBuf) -> Self {
        Self {
            app_path,
            background_path,
            volume_name: None,
            output_dir: None,
            volume_size: DEFAULT_VOLUME_SIZE.to_string(),
            icon_size: DEFAULT_ICON_SIZE,
            window_bounds: None,
            app_position: None,
            applications_position: None,
            signing_identity: None,
        }
    }

    /// Overrides the volume name derived from the app bundle's file name.
    pub fn volume_name<S: Into<String>>(mut self, name: S) -> Self {
        self.volume_name = Some(name.into());
        self
    }

    /// Sets the output directory.
    ///
    /// Default: the current working directory.
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Sets the volume capacity requested from hdiutil.
    ///
    /// Default: `"200m"`.
    pub fn volume_size<S: Into<String>>(mut self, size: S) -> Self {
        self.volume_size = size.into();
        self
    }

    /// Sets the Finder icon size inside the DMG window.
    ///
    /// Default: `100`.
    pub fn icon_size(mut self, size: u32) -> Self {
        self.icon_size = size;
        self
    }

    /// Overrides the window bounds derived from the background image.
    pub fn window_bounds(mut self, bounds: WindowBounds) -> Self {
        self.window_bounds = Some(bounds);
        self
    }

    /// Overrides the app icon position derived from the background image.
    pub fn app_position(mut self, position: IconPosition) -> Self {
        self.app_position = Some(position);
        self
    }

    /// Overrides the Applications-shortcut position derived from the
    /// background image.
    pub fn applications_position(mut self, position: IconPosition) -> Self {
        self.applications_position = Some(position);
        self
    }

    /// Signs the final image with the given keychain identity.
    pub fn signing_identity<S: Into<String>>(mut self, identity: S) -> Self {
        self.signing_identity = Some(identity.into());
        self
    }

    /// Validates the sources and builds the configuration.
    ///
    /// The app bundle is checked first, then the background image. The
    /// background's pixel dimensions are read exactly once here, both to
    /// derive any layout that was not supplied explicitly and to reject
    /// files that are not readable images.
    ///
    /// # Errors
    ///
    /// - [`Error::AppNotFound`] when the app bundle path does not exist or
    ///   has no usable file name.
    /// - [`Error::BackgroundNotFound`] when the background image path does
    ///   not exist or its dimensions cannot be read.
    pub async fn build(self) -> Result<DmgConfig> {
        if !tokio::fs::try_exists(&self.app_path).await.unwrap_or(false) {
            return Err(Error::AppNotFound {
                path: self.app_path,
            });
        }
        if !tokio::fs::try_exists(&self.background_path)
            .await
            .unwrap_or(false)
        {
            return Err(Error::BackgroundNotFound {
                path: self.background_path,
            });
        }

        let app_file_name = utf8_file_name(&self.app_path).ok_or_else(|| Error::AppNotFound {
            path: self.app_path.clone(),
        })?;
        let background_file_name =
            utf8_file_name(&self.background_path).ok_or_else(|| Error::BackgroundNotFound {
                path: self.background_path.clone(),
            })?;
        let volume_name = match self.volume_name {
            Some(name) => name,
            None => self
                .app_path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_owned)
                .ok_or_else(|| Error::AppNotFound {
                    path: self.app_path.clone(),
                })?,
        };

        // Decoding image headers is blocking work; keep it off the runtime.
        let background = self.background_path.clone();
        let (image_width, image_height) =
            tokio::task::spawn_blocking(move || image::image_dimensions(&background))
                .await
                .map_err(|e| Error::Io(std::io::Error::other(e)))?
                .map_err(|_| Error::BackgroundNotFound {
                    path: self.background_path.clone(),
                })?;

        let output_dir = match self.output_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };

        Ok(DmgConfig {
            volume_name,
            app_path: self.app_path,
            app_file_name,
            background_path: self.background_path,
            background_file_name,
            output_dir,
            volume_size: self.volume_size,
            icon_size: self.icon_size,
            window_bounds: self
                .window_bounds
                .unwrap_or_else(|| geometry::window_bounds(image_width, image_height)),
            app_position: self
                .app_position
                .unwrap_or_else(|| geometry::app_position(image_width, image_height)),
            applications_position: self
                .applications_position
                .unwrap_or_else(|| geometry::applications_position(image_width, image_height)),
            signing_identity: self.signing_identity,
        })
    }
}

/// Final path component as an owned UTF-8 string.
fn utf8_file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
}
