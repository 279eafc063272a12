#![allow(dead_code)]

use assert_cmd::cargo;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

pub const HEADER: &str = "symbol,price,shares,is_foreign_market\n";

/// Isolated HOME/config dir so no user config or secrets leak into tests
pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("orca"));
    cmd.env("HOME", home.path());
    cmd.env("XDG_CONFIG_HOME", home.path().join(".config"));
    for key in [
        "ORCA_CONFIG",
        "ORCA_MAILGUN_DOMAIN",
        "ORCA_MAILGUN_API_KEY",
        "ORCA_MAILGUN_RECIPIENT",
        "ORCA_QUOTE_URL",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd.arg("--no-color");
    cmd
}

pub fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}

pub fn write_holdings(dir: &TempDir, rows: &str) -> PathBuf {
    write_file(dir, "holdings.csv", &format!("{}{}", HEADER, rows))
}

pub fn write_quotes(dir: &TempDir, json: &str) -> PathBuf {
    write_file(dir, "quotes.json", json)
}
