//! Window and icon layout derived from the background image.
//!
//! The Finder window is sized to show the background picture edge to edge,
//! and the two icons (the app and the Applications shortcut) sit on its
//! horizontal quarter lines, slightly above the vertical center. All math
//! is plain truncating 64-bit integer division.

/// Horizontal screen origin of the DMG window.
const WINDOW_LEFT: i64 = 400;

/// Vertical screen origin of the DMG window.
const WINDOW_TOP: i64 = 100;

/// Extra window height so the title bar does not clip the background.
const TITLE_BAR_HEIGHT: i64 = 22;

/// Icons sit this many pixels above the vertical midline.
const VERTICAL_NUDGE: i64 = 10;

/// Finder window bounds.
///
/// `width` and `height` carry the right and bottom edges of the box, not a
/// size: Finder's `bounds` property takes all four edges, and the
/// customization script forwards these fields verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowBounds {
    /// Left edge on screen
    pub x: i64,
    /// Top edge on screen
    pub y: i64,
    /// Right edge on screen
    pub width: i64,
    /// Bottom edge on screen
    pub height: i64,
}

/// Position of an icon inside the DMG window, in window coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IconPosition {
    pub x: i64,
    pub y: i64,
}

/// Window bounds for a background image of the given pixel dimensions.
///
/// The window opens at a fixed screen origin and is exactly as wide as the
/// image, with [`TITLE_BAR_HEIGHT`] extra points of height.
pub fn window_bounds(image_width: u32, image_height: u32) -> WindowBounds {
    WindowBounds {
        x: WINDOW_LEFT,
        y: WINDOW_TOP,
        width: WINDOW_LEFT + image_width as i64,
        height: WINDOW_TOP + image_height as i64 + TITLE_BAR_HEIGHT,
    }
}

/// App icon position: a quarter of the way across, near vertical center.
pub fn app_position(image_width: u32, image_height: u32) -> IconPosition {
    IconPosition {
        x: image_width as i64 / 4,
        y: image_height as i64 / 2 - VERTICAL_NUDGE,
    }
}

/// Applications-shortcut position: mirrors the app icon on the right side.
pub fn applications_position(image_width: u32, image_height: u32) -> IconPosition {
    IconPosition {
        x: image_width as i64 * 3 / 4,
        y: image_height as i64 / 2 - VERTICAL_NUDGE,
    }
}
