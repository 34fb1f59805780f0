mod common;

use common::make_fixtures;
use dmgforge::dmg::geometry::{IconPosition, WindowBounds};
use dmgforge::{DmgConfig, Error};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[tokio::test]
async fn derives_name_and_paths_from_app_bundle() {
    let dir = TempDir::new().expect("temp dir");
    let (app, background) = make_fixtures(dir.path(), 600, 400);

    let out = dir.path().join("dist");
    let config = DmgConfig::builder(&app, &background)
        .output_dir(&out)
        .build()
        .await
        .expect("valid config");

    assert_eq!(config.volume_name(), "TestApp");
    assert_eq!(config.app_file_name(), "TestApp.app");
    assert_eq!(config.background_file_name(), "background.png");
    assert_eq!(config.output_path(), out.join("TestApp.dmg"));
    assert_eq!(config.temp_image_path(), out.join("TestApp-temp.dmg"));
    assert_eq!(config.mount_point(), PathBuf::from("/Volumes/TestApp"));
}

#[tokio::test]
async fn missing_app_reported_before_missing_background() {
    let dir = TempDir::new().expect("temp dir");

    let err = DmgConfig::builder(dir.path().join("Ghost.app"), dir.path().join("ghost.png"))
        .build()
        .await
        .expect_err("both sources missing");

    assert!(matches!(err, Error::AppNotFound { .. }));
}

#[tokio::test]
async fn missing_background_carries_its_path() {
    let dir = TempDir::new().expect("temp dir");
    let (app, _) = make_fixtures(dir.path(), 10, 10);
    let ghost = dir.path().join("ghost.png");

    let err = DmgConfig::builder(&app, &ghost)
        .build()
        .await
        .expect_err("background missing");

    match err {
        Error::BackgroundNotFound { path } => assert_eq!(path, ghost),
        other => panic!("expected BackgroundNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn unreadable_background_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let (app, background) = make_fixtures(dir.path(), 10, 10);
    fs::write(&background, "not an image").expect("corrupt background");

    let err = DmgConfig::builder(&app, &background)
        .build()
        .await
        .expect_err("background undecodable");

    assert!(matches!(err, Error::BackgroundNotFound { .. }));
}

#[tokio::test]
async fn layout_derived_from_background_dimensions() {
    let dir = TempDir::new().expect("temp dir");
    let (app, background) = make_fixtures(dir.path(), 600, 400);

    let config = DmgConfig::builder(&app, &background)
        .build()
        .await
        .expect("valid config");

    let bounds = config.window_bounds();
    assert_eq!((bounds.x, bounds.y), (400, 100));
    assert_eq!((bounds.width, bounds.height), (1000, 522));

    let app_icon = config.app_position();
    assert_eq!((app_icon.x, app_icon.y), (150, 190));

    let applications = config.applications_position();
    assert_eq!((applications.x, applications.y), (450, 190));
}

#[tokio::test]
async fn explicit_layout_wins_over_derived() {
    let dir = TempDir::new().expect("temp dir");
    let (app, background) = make_fixtures(dir.path(), 600, 400);

    let config = DmgConfig::builder(&app, &background)
        .window_bounds(WindowBounds {
            x: 0,
            y: 0,
            width: 90,
            height: 80,
        })
        .app_position(IconPosition { x: 1, y: 2 })
        .applications_position(IconPosition { x: 3, y: 4 })
        .build()
        .await
        .expect("valid config");

    assert_eq!(config.window_bounds().width, 90);
    assert_eq!(config.window_bounds().height, 80);
    assert_eq!((config.app_position().x, config.app_position().y), (1, 2));
    assert_eq!(
        (
            config.applications_position().x,
            config.applications_position().y
        ),
        (3, 4)
    );
}

#[tokio::test]
async fn defaults_cover_size_icon_and_signing() {
    let dir = TempDir::new().expect("temp dir");
    let (app, background) = make_fixtures(dir.path(), 10, 10);

    let config = DmgConfig::builder(&app, &background)
        .build()
        .await
        .expect("valid config");

    assert_eq!(config.volume_size(), "200m");
    assert_eq!(config.icon_size(), 100);
    assert!(config.signing_identity().is_none());
}

#[tokio::test]
async fn volume_name_override_rewrites_derived_paths() {
    let dir = TempDir::new().expect("temp dir");
    let (app, background) = make_fixtures(dir.path(), 10, 10);

    let config = DmgConfig::builder(&app, &background)
        .volume_name("My App 2.0")
        .output_dir(dir.path())
        .build()
        .await
        .expect("valid config");

    assert_eq!(config.output_path(), dir.path().join("My App 2.0.dmg"));
    assert_eq!(
        config.mount_point(),
        PathBuf::from("/Volumes/My App 2.0")
    );
}
