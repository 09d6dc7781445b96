use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_missing_credentials_fail_fast() {
    let mut cmd = Command::new(cargo_bin!("hakiyetu-mpesa"));
    for key in [
        "MPESA_CONSUMER_KEY",
        "MPESA_CONSUMER_SECRET",
        "MPESA_PASSKEY",
        "MPESA_CALLBACK_URL",
    ] {
        cmd.env_remove(key);
    }

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("missing environment variable"));
}

#[test]
fn test_unknown_environment_is_rejected() {
    let mut cmd = Command::new(cargo_bin!("hakiyetu-mpesa"));
    cmd.env("MPESA_CONSUMER_KEY", "key")
        .env("MPESA_CONSUMER_SECRET", "secret")
        .env("MPESA_PASSKEY", "passkey")
        .env("MPESA_CALLBACK_URL", "https://example.com/callback")
        .env("MPESA_ENVIRONMENT", "staging");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown environment"));
}

#[test]
fn test_help_lists_bind_flag() {
    let mut cmd = Command::new(cargo_bin!("hakiyetu-mpesa"));
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--bind"));
}
