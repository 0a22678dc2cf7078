
#[path = "../src/model.rs"]
#[allow(dead_code)]
mod model;

#[path = "../src/codec.rs"]
#[allow(dead_code)]
mod codec;

#[path = "../src/store.rs"]
#[allow(dead_code)]
mod store;

use store::Store;
use test_support::temp_dir;

#[test]
fn backup_copies_every_existing_file_with_the_stamp_suffix() {
    let dir = temp_dir("rollbook-backup-all");
    std::fs::write(dir.join("users.json"), "[]").expect("seed users");
    std::fs::write(
        dir.join("attendance.csv"),
        "student_id,course_id,date,status,recorded_by\n",
    )
    .expect("seed attendance");
    let store = Store::new(&dir).expect("open store");

    assert!(store.backup_data_at("20260101_120000"));

    let backups = dir.join("backups");
    assert!(backups.join("users.json.20260101_120000.bak").is_file());
    assert!(backups.join("attendance.csv.20260101_120000.bak").is_file());
    // grades.csv never existed, so no backup appears for it.
    assert!(!backups.join("grades.csv.20260101_120000.bak").exists());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn colliding_stamps_keep_the_later_copy() {
    let dir = temp_dir("rollbook-backup-collide");
    std::fs::write(dir.join("users.json"), "[\"first\"]").expect("seed users");
    let store = Store::new(&dir).expect("open store");

    assert!(store.backup_data_at("20260101_120000"));
    std::fs::write(dir.join("users.json"), "[\"second\"]").expect("update users");
    assert!(store.backup_data_at("20260101_120000"));

    let backup = dir
        .join("backups")
        .join("users.json.20260101_120000.bak");
    let text = std::fs::read_to_string(backup).expect("read backup");
    assert_eq!(text, "[\"second\"]");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn distinct_stamps_accumulate_without_rotation() {
    let dir = temp_dir("rollbook-backup-accumulate");
    std::fs::write(dir.join("users.json"), "[]").expect("seed users");
    let store = Store::new(&dir).expect("open store");

    assert!(store.backup_data_at("20260101_120000"));
    assert!(store.backup_data_at("20260101_120001"));

    let entries = std::fs::read_dir(dir.join("backups"))
        .expect("list backups")
        .count();
    assert_eq!(entries, 2);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn backup_with_nothing_to_copy_reports_false() {
    let dir = temp_dir("rollbook-backup-nothing");
    let store = Store::new(&dir).expect("open store");
    assert!(!store.backup_data_at("20260101_120000"));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn live_backup_uses_the_timestamp_format() {
    let dir = temp_dir("rollbook-backup-live");
    std::fs::write(dir.join("users.json"), "[]").expect("seed users");
    let store = Store::new(&dir).expect("open store");

    assert!(store.backup_data());

    let entry = std::fs::read_dir(dir.join("backups"))
        .expect("list backups")
        .next()
        .expect("one backup entry")
        .expect("read entry");
    let name = entry.file_name().into_string().expect("utf8 name");
    // users.json.YYYYMMDD_HHMMSS.bak
    let stamp = name
        .strip_prefix("users.json.")
        .and_then(|rest| rest.strip_suffix(".bak"))
        .expect("stamped name");
    assert_eq!(stamp.len(), 15);
    assert_eq!(stamp.as_bytes()[8], b'_');
    assert!(stamp
        .chars()
        .enumerate()
        .all(|(i, c)| i == 8 || c.is_ascii_digit()));

    let _ = std::fs::remove_dir_all(dir);
}
