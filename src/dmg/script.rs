//! Finder customization script for the mounted volume.
//!
//! Finder persists window geometry, icon positions, icon size and the
//! background picture into the volume's `.DS_Store`, so arranging the
//! window once while the image is mounted is what makes the final DMG open
//! pre-arranged on the user's machine.

use crate::dmg::geometry::{IconPosition, WindowBounds};

/// Renders the AppleScript that arranges the DMG's Finder window.
///
/// Values are substituted verbatim; item names must not contain double
/// quotes. The trailing `delay 2` keeps Finder alive long enough to flush
/// the window state before the script returns.
pub fn finder_customization_script(
    volume_name: &str,
    app_file_name: &str,
    background_file_name: &str,
    icon_size: u32,
    window_bounds: WindowBounds,
    app_position: IconPosition,
    applications_position: IconPosition,
) -> String {
    format!(
        r#"tell application "Finder"
    tell disk "{volume_name}"
        open
        set current view of container window to icon view
        set toolbar visible of container window to false
        set statusbar visible of container window to false
        set the bounds of container window to {{{bounds_x}, {bounds_y}, {bounds_right}, {bounds_bottom}}}
        set viewOptions to the icon view options of container window
        set arrangement of viewOptions to not arranged
        set icon size of viewOptions to {icon_size}
        set background picture of viewOptions to file ".background:{background_file_name}"
        set position of item "{app_file_name}" of container window to {{{app_x}, {app_y}}}
        set position of item "Applications" of container window to {{{applications_x}, {applications_y}}}
        close
        open
        update without registering applications
        delay 2
    end tell
end tell"#,
        bounds_x = window_bounds.x,
        bounds_y = window_bounds.y,
        bounds_right = window_bounds.width,
        bounds_bottom = window_bounds.height,
        app_x = app_position.x,
        app_y = app_position.y,
        applications_x = applications_position.x,
        applications_y = applications_position.y,
    )
}
