//! Best-effort custom volume icon for finished disk images.
//!
//! Composites the bundled application's icon over a drive icon and attaches
//! the result to the `.dmg` file, so the installer shows up in Finder as a
//! branded disk instead of a generic document. Everything here is
//! best-effort: a bundle without an icon, an unreadable resource, or a
//! missing `Rez`/`SetFile` toolchain downgrades the step to a debug log.
//! It never fails a build.

use crate::error::Result;
use crate::os::exec::CommandRunner;
use icns::{IconFamily, IconType, Image as IcnsImage, PixelFormat};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::Deserialize;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Composite canvas edge in pixels.
const CANVAS_SIZE: u32 = 512;

/// Fraction of the canvas covered by the app icon overlay.
const APP_ICON_SCALE: f32 = 0.6;

/// Pixels the app icon sits above dead center.
const APP_ICON_LIFT: i64 = 20;

/// Vertical drop of the shadow below the app icon, in pixels.
const SHADOW_DROP: i64 = 3;

/// Gaussian blur sigma for the drop shadow.
const SHADOW_BLUR: f32 = 5.0;

/// Opacity of the drop shadow.
const SHADOW_ALPHA: f32 = 0.3;

/// Padding around the shadow layer so the blur has room to bleed.
const SHADOW_MARGIN: u32 = 10;

/// Finder custom-icon resource id.
const CUSTOM_ICON_RESOURCE_ID: i32 = -16455;

/// Stock Finder icon for removable media.
const REMOVABLE_MEDIA_ICON: &str =
    "/System/Library/CoreServices/CoreTypes.bundle/Contents/Resources/GenericRemovableMediaIcon.icns";

/// Root-volume fallbacks, tried in order.
const ROOT_DRIVE_ICONS: [&str; 2] = [
    "/.VolumeIcon.icns",
    "/System/Library/CoreServices/CoreTypes.bundle/Contents/Resources/GenericHardDiskIcon.icns",
];

/// Source resolutions to try when decoding an icon family. Modern RGBA
/// entries come first, largest first; the legacy RGB24 entries cover stock
/// drive icons that predate them.
const PREFERRED_SOURCE_TYPES: [IconType; 13] = [
    IconType::RGBA32_512x512_2x,
    IconType::RGBA32_512x512,
    IconType::RGBA32_256x256_2x,
    IconType::RGBA32_256x256,
    IconType::RGBA32_128x128_2x,
    IconType::RGBA32_128x128,
    IconType::RGBA32_64x64,
    IconType::RGBA32_32x32,
    IconType::RGBA32_16x16,
    IconType::RGB24_128x128,
    IconType::RGB24_48x48,
    IconType::RGB24_32x32,
    IconType::RGB24_16x16,
];

/// Resolutions written into the composite icon family.
const COMPOSITE_VARIANTS: [(IconType, u32); 3] = [
    (IconType::RGBA32_512x512, 512),
    (IconType::RGBA32_256x256, 256),
    (IconType::RGBA32_128x128, 128),
];

/// Check if the Rez/SetFile toolchain is available for icon attachment.
///
/// Cached result to avoid repeated lookups during a build.
static HAS_ICON_TOOLS: LazyLock<bool> =
    LazyLock::new(|| match (which::which("Rez"), which::which("SetFile")) {
        (Ok(rez), Ok(setfile)) => {
            log::debug!(
                "Found Rez at {} and SetFile at {}",
                rez.display(),
                setfile.display()
            );
            true
        }
        _ => {
            log::debug!("Rez/SetFile not found in PATH; custom volume icons will be skipped");
            false
        }
    });

/// The slice of Info.plist this module cares about.
#[derive(Debug, Deserialize)]
struct BundleManifest {
    #[serde(rename = "CFBundleIconFile")]
    icon_file: Option<String>,
}

/// The slice of `diskutil info -plist` output this module cares about.
#[derive(Debug, Deserialize)]
struct DiskInfo {
    #[serde(rename = "Ejectable", default)]
    ejectable: bool,
    #[serde(rename = "RemovableMedia", default)]
    removable_media: bool,
}

/// Composites the app bundle's icon onto a drive icon and attaches it to
/// `dmg_path` as the Finder custom icon.
///
/// Returns `Ok(())` in every expected situation; only unexpected failures
/// while writing scratch files or running the attachment tools surface as
/// errors, and the caller treats those as advisory.
pub async fn apply_custom_icon<E: CommandRunner>(
    exec: &E,
    dmg_path: &Path,
    app_path: &Path,
) -> Result<()> {
    let Some(app_icon_path) = bundle_icon_path(app_path) else {
        log::debug!(
            "{} declares no usable icon; skipping custom volume icon",
            app_path.display()
        );
        return Ok(());
    };
    let Ok(app_bytes) = tokio::fs::read(&app_icon_path).await else {
        log::debug!(
            "could not read {}; skipping custom volume icon",
            app_icon_path.display()
        );
        return Ok(());
    };

    if !*HAS_ICON_TOOLS {
        return Ok(());
    }

    let Some(drive_bytes) = select_drive_icon(exec).await else {
        log::debug!("no drive icon available; skipping custom volume icon");
        return Ok(());
    };

    // Decoding, compositing and re-encoding is CPU work; keep it off the
    // runtime threads.
    let encoded = tokio::task::spawn_blocking(move || {
        let app = decode_icns(&app_bytes)?;
        let drive = decode_icns(&drive_bytes)?;
        encode_composite(&composite_volume_icon(&drive, &app))
    })
    .await
    .ok()
    .flatten();
    let Some(encoded) = encoded else {
        log::debug!("could not composite volume icon; skipping");
        return Ok(());
    };

    let scratch = tempfile::tempdir()?;
    let icns_path = scratch.path().join("VolumeIcon.icns");
    tokio::fs::write(&icns_path, &encoded).await?;

    // Rez compiles this one-liner and appends the icon resource to the DMG;
    // SetFile then flips the has-custom-icon Finder bit.
    let resource_script = scratch.path().join("VolumeIcon.r");
    tokio::fs::write(
        &resource_script,
        format!(
            "read 'icns' ({}) \"{}\";\n",
            CUSTOM_ICON_RESOURCE_ID,
            icns_path.display()
        ),
    )
    .await?;

    let dmg = dmg_path.to_string_lossy();
    exec.run(
        "Rez",
        &[
            "-append",
            resource_script.to_string_lossy().as_ref(),
            "-o",
            dmg.as_ref(),
        ],
    )
    .await?;
    exec.run("SetFile", &["-a", "C", dmg.as_ref()]).await?;

    log::info!("✓ Applied custom volume icon to {}", dmg_path.display());
    Ok(())
}

/// Resolves the app bundle's declared icon to a path under
/// `Contents/Resources/`.
///
/// `CFBundleIconFile` may omit the `.icns` extension; it is appended when
/// missing. Returns `None` when the manifest, the declaration, or the icon
/// file itself is absent.
pub fn bundle_icon_path(app_path: &Path) -> Option<PathBuf> {
    let manifest_path = app_path.join("Contents/Info.plist");
    let manifest: BundleManifest = plist::from_file(&manifest_path).ok()?;
    let declared = manifest.icon_file?;

    let file_name = if declared.ends_with(".icns") {
        declared
    } else {
        format!("{}.icns", declared)
    };

    let icon_path = app_path.join("Contents/Resources").join(file_name);
    icon_path.exists().then_some(icon_path)
}

/// Picks the drive icon to composite under the app icon.
///
/// Prefers a currently mounted removable or ejectable volume's icon, then
/// falls back to the root volume's. Which icon this finds depends on what
/// happens to be mounted, so the result is not deterministic across
/// machines; every probe failure just moves on.
async fn select_drive_icon<E: CommandRunner>(exec: &E) -> Option<Vec<u8>> {
    if let Some(volume) = removable_volume(exec).await {
        if let Ok(bytes) = tokio::fs::read(volume.join(".VolumeIcon.icns")).await {
            return Some(bytes);
        }
        if let Ok(bytes) = tokio::fs::read(REMOVABLE_MEDIA_ICON).await {
            return Some(bytes);
        }
    }

    for candidate in ROOT_DRIVE_ICONS {
        if let Ok(bytes) = tokio::fs::read(candidate).await {
            return Some(bytes);
        }
    }

    None
}

/// First mounted volume that reports itself removable or ejectable.
async fn removable_volume<E: CommandRunner>(exec: &E) -> Option<PathBuf> {
    let mut volumes = tokio::fs::read_dir("/Volumes").await.ok()?;
    loop {
        let entry = match volumes.next_entry().await {
            Ok(Some(entry)) => entry,
            _ => return None,
        };
        let path = entry.path();
        if volume_is_removable(exec, &path).await {
            return Some(path);
        }
    }
}

/// Asks diskutil whether the volume is removable or ejectable.
async fn volume_is_removable<E: CommandRunner>(exec: &E, volume: &Path) -> bool {
    let output = match exec
        .run_captured(
            "diskutil",
            &["info", "-plist", volume.to_string_lossy().as_ref()],
        )
        .await
    {
        Ok(output) => output,
        Err(_) => return false,
    };

    match plist::from_bytes::<DiskInfo>(output.as_bytes()) {
        Ok(info) => info.ejectable || info.removable_media,
        Err(_) => false,
    }
}

/// Draws the drive icon full-canvas, then the app icon at 60 % scale,
/// centered and lifted slightly above center, over a soft drop shadow.
pub fn composite_volume_icon(drive: &RgbaImage, app: &RgbaImage) -> RgbaImage {
    let mut canvas = imageops::resize(drive, CANVAS_SIZE, CANVAS_SIZE, FilterType::Lanczos3);

    let app_edge = (CANVAS_SIZE as f32 * APP_ICON_SCALE) as u32;
    let app_icon = imageops::resize(app, app_edge, app_edge, FilterType::Lanczos3);
    let corner = ((CANVAS_SIZE - app_edge) / 2) as i64;
    let top = corner - APP_ICON_LIFT;

    let shadow = shadow_layer(&app_icon);
    let margin = SHADOW_MARGIN as i64;
    imageops::overlay(&mut canvas, &shadow, corner - margin, top - margin + SHADOW_DROP);
    imageops::overlay(&mut canvas, &app_icon, corner, top);

    canvas
}

/// Black translucent silhouette of the icon, blurred into a soft shadow.
fn shadow_layer(app_icon: &RgbaImage) -> RgbaImage {
    let mut layer = RgbaImage::new(
        app_icon.width() + SHADOW_MARGIN * 2,
        app_icon.height() + SHADOW_MARGIN * 2,
    );
    for (x, y, pixel) in app_icon.enumerate_pixels() {
        let alpha = (pixel[3] as f32 * SHADOW_ALPHA) as u8;
        layer.put_pixel(x + SHADOW_MARGIN, y + SHADOW_MARGIN, Rgba([0, 0, 0, alpha]));
    }
    imageops::blur(&layer, SHADOW_BLUR)
}

/// Decodes the best available resolution of an icon family into RGBA.
///
/// Returns `None` when the bytes are not an icon family or the family
/// carries none of the supported entry types.
pub fn decode_icns(bytes: &[u8]) -> Option<RgbaImage> {
    let family = IconFamily::read(Cursor::new(bytes)).ok()?;
    let icon = PREFERRED_SOURCE_TYPES
        .iter()
        .find_map(|icon_type| family.get_icon_with_type(*icon_type).ok())?;
    let rgba = icon.convert_to(PixelFormat::RGBA);
    RgbaImage::from_raw(rgba.width(), rgba.height(), rgba.data().to_vec())
}

/// Encodes the composite into an icon family with a few standard sizes.
fn encode_composite(canvas: &RgbaImage) -> Option<Vec<u8>> {
    let mut family = IconFamily::new();

    for (icon_type, size) in COMPOSITE_VARIANTS {
        let scaled = if size == CANVAS_SIZE {
            canvas.clone()
        } else {
            imageops::resize(canvas, size, size, FilterType::Lanczos3)
        };
        let icon = IcnsImage::from_data(PixelFormat::RGBA, size, size, scaled.into_raw()).ok()?;
        family.add_icon_with_type(&icon, icon_type).ok()?;
    }

    let mut encoded = Vec::new();
    family.write(&mut encoded).ok()?;
    Some(encoded)
}
