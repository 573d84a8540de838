#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn sp() -> Command {
    cargo_bin_cmd!("shiftpoint")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_shiftpoint.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Work site used by the fixtures.
pub const SITE: &str = "48.856600,2.352200";
/// ~445 m north of SITE, inside the 500 m radius.
pub const NEAR_SITE: &str = "48.860600,2.352200";
/// ~1.5 km north of SITE, outside the radius.
pub const FAR_FROM_SITE: &str = "48.870000,2.352200";

/// Initialize the DB and register tenant 1 with worker 1.
pub fn init_tenant_and_worker(db_path: &str) {
    sp().args(["--db", db_path, "init"]).assert().success();

    sp().args(["--db", db_path, "tenant", "acme"])
        .assert()
        .success();

    sp().args([
        "--db",
        db_path,
        "worker",
        "--tenant",
        "1",
        "mara",
        "--phone",
        "+33123456789",
    ])
    .assert()
    .success();
}

/// Create contract 1 for worker 1: 09:00-17:00 tenant-local on `day`,
/// evaluated with the clock pinned to `now`.
pub fn add_day_contract(db_path: &str, day: &str, now: &str) {
    sp().args([
        "--db",
        db_path,
        "--now",
        now,
        "contract",
        "add",
        "--tenant",
        "1",
        "--location",
        SITE,
        "--start",
        &format!("{} 09:00", day),
        "--end",
        &format!("{} 17:00", day),
        "--worker",
        "1",
    ])
    .assert()
    .success();
}

/// Run a pointage for worker 1 on contract 1 with the clock pinned to `now`.
pub fn pointage(db_path: &str, location: &str, now: &str) -> assert_cmd::assert::Assert {
    sp().args([
        "--db",
        db_path,
        "--now",
        now,
        "pointage",
        "--tenant",
        "1",
        "--contract",
        "1",
        "--worker",
        "1",
        "--location",
        location,
    ])
    .assert()
}
