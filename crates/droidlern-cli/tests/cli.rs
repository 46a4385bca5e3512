use assert_cmd::Command;
use predicates::prelude::*;

fn droidlern() -> Command {
    let mut cmd = Command::cargo_bin("droidlern").unwrap_or_else(|e| panic!("binary missing: {e}"));
    cmd.env_remove("ANDROID_SERIAL")
        .env("DROIDLERN_ADB", "/nonexistent/droidlern/adb");
    cmd
}

#[test]
fn help_lists_subcommands() {
    droidlern()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("devices")
                .and(predicate::str::contains("screenshot"))
                .and(predicate::str::contains("step")),
        );
}

#[test]
fn invalid_action_is_rejected_before_connecting() {
    droidlern()
        .args(["act", "--device", "emulator-5554", r#"{"action_type":9}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown action type: 9"));
}

#[test]
fn missing_adb_is_reported() {
    droidlern()
        .arg("devices")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not list devices"));
}

#[test]
fn unreachable_device_aborts() {
    droidlern()
        .args(["size", "--device", "emulator-5554"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to connect to emulator-5554"));
}

#[test]
fn device_is_required() {
    droidlern().arg("size").assert().failure();
}
