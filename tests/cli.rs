use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

#[test]
fn cli_version_flag() {
    Command::cargo_bin("orgatlas")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_help_lists_subcommands() {
    Command::cargo_bin("orgatlas")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("inventory").and(contains("accounts")));
}

#[test]
fn cli_inventory_help() {
    Command::cargo_bin("orgatlas")
        .unwrap()
        .args(["inventory", "--help"])
        .assert()
        .success()
        .stdout(contains("--output-dir"));
}

#[test]
fn cli_accounts_help() {
    Command::cargo_bin("orgatlas")
        .unwrap()
        .args(["accounts", "--help"])
        .assert()
        .success()
        .stdout(contains("organizational-unit tree").and(contains("--output-dir")));
}

#[test]
fn cli_rejects_unknown_subcommand() {
    Command::cargo_bin("orgatlas").unwrap().arg("frobnicate").assert().failure();
}
