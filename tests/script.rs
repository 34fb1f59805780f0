use dmgforge::dmg::finder_customization_script;
use dmgforge::dmg::geometry::{IconPosition, WindowBounds};

fn sample_script() -> String {
    finder_customization_script(
        "TestApp",
        "TestApp.app",
        "custom-bg.jpg",
        150,
        WindowBounds {
            x: 100,
            y: 200,
            width: 800,
            height: 600,
        },
        IconPosition { x: 200, y: 300 },
        IconPosition { x: 500, y: 400 },
    )
}

#[test]
fn script_targets_the_volume_by_name() {
    let script = sample_script();
    assert!(script.contains(r#"tell disk "TestApp""#));
    assert!(script.starts_with(r#"tell application "Finder""#));
    assert!(script.ends_with("end tell"));
}

#[test]
fn script_substitutes_layout_values_verbatim() {
    let script = sample_script();
    assert!(script.contains("set the bounds of container window to {100, 200, 800, 600}"));
    assert!(script.contains(r#"set position of item "TestApp.app" of container window to {200, 300}"#));
    assert!(script.contains(r#"set position of item "Applications" of container window to {500, 400}"#));
    assert!(script.contains("set icon size of viewOptions to 150"));
}

#[test]
fn script_points_at_the_hidden_background() {
    let script = sample_script();
    assert!(script.contains(r#"set background picture of viewOptions to file ".background:custom-bg.jpg""#));
}

#[test]
fn script_reopens_window_and_waits_for_finder() {
    let script = sample_script();

    // The close/open pair forces Finder to re-read the saved state, and
    // the delay keeps it alive long enough to flush .DS_Store.
    let close = script.find("close").expect("close present");
    let reopen = script[close..].find("open").expect("reopen present");
    assert!(reopen > 0);
    assert!(script.contains("delay 2"));
    assert!(script.contains("update without registering applications"));
}
