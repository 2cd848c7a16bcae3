#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn paysm(db_path: &Path, args: &[&str]) -> String {
    let output = Command::new(cargo_bin!("paysm"))
        .arg("--db-path")
        .arg(db_path)
        .args(args)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "{:?} failed", args);
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_rocksdb_rehydrates_across_runs() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: create the payment
    let created = paysm(&db_path, &["create", "--amount", "100"]);
    let row = created.lines().nth(1).expect("missing payment row");
    assert!(row.ends_with(",NEW,100"));
    let id = row.split(',').next().unwrap().to_string();

    // 2. Second run: pre-authorize the stored payment
    let pre_authorized = paysm(&db_path, &["--approval-rate", "1", "pre-authorize", &id]);
    assert!(pre_authorized.contains(&format!("{},PRE_AUTH,100", id)));

    // 3. Third run: authorize it
    let authorized = paysm(&db_path, &["--approval-rate", "1", "authorize", &id]);
    assert!(authorized.contains(&format!("{},AUTH,100", id)));

    // 4. Terminal state survives further events
    paysm(&db_path, &["decline", &id]);
    let shown = paysm(&db_path, &["show", &id]);
    assert!(shown.contains(&format!("{},AUTH,100", id)));
}
