mod common;

use common::RecordingRunner;
use dmgforge::Error;
use dmgforge::signing::{list_identities, validate_identity};

const REPORT: &str = concat!(
    "  1) A1B2C3D4E5F6071829384756ABCDEF0123456789 ",
    "\"Developer ID Application: Example Corp (ABC123DEF4)\"\n",
    "     1 valid identities found"
);

fn keychain() -> RecordingRunner {
    RecordingRunner::new().captured_output("security", REPORT)
}

#[tokio::test]
async fn listing_returns_the_keychain_report() {
    let runner = keychain();

    let report = list_identities(&runner).await.expect("listing succeeds");

    assert_eq!(report, REPORT);
    assert_eq!(
        runner.command_lines(),
        vec!["security find-identity -v -p codesigning".to_string()]
    );
}

#[tokio::test]
async fn known_identity_validates() {
    let runner = keychain();

    validate_identity(&runner, "Developer ID Application: Example Corp (ABC123DEF4)")
        .await
        .expect("identity is in the keychain");
}

#[tokio::test]
async fn sha1_hash_form_validates_too() {
    let runner = keychain();

    validate_identity(&runner, "A1B2C3D4E5F6071829384756ABCDEF0123456789")
        .await
        .expect("hash form matches the report");
}

#[tokio::test]
async fn unknown_identity_rejected_with_the_available_report() {
    let runner = keychain();

    let err = validate_identity(&runner, "Developer ID Application: Typo Corp")
        .await
        .expect_err("identity is not in the keychain");

    match err {
        Error::CommandFailed { command, output } => {
            assert!(command.contains("find-identity"));
            assert!(output.contains("\"Developer ID Application: Typo Corp\""));
            // the report rides along so the caller can show what exists
            assert!(output.contains("Example Corp (ABC123DEF4)"));
        }
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}
