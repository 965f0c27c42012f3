//! CLI command integration tests.
//! Each test uses a temp directory via LOTUS_DATA_DIR for full isolation,
//! and scrubs the cloud env vars so every run starts in guest mode.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn lotus_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("lotus").unwrap();
    cmd.env("LOTUS_DATA_DIR", data_dir.path());
    cmd.env_remove("LOTUS_REMOTE_URL");
    cmd.env_remove("LOTUS_PRINCIPAL");
    cmd
}

#[test]
fn stats_fresh_vault() {
    let dir = TempDir::new().unwrap();
    lotus_cmd(&dir)
        .args(["stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total:     0 min"))
        .stdout(predicate::str::contains("streak:    0 days"))
        .stdout(predicate::str::contains("last:      never"))
        .stdout(predicate::str::contains("phase:     0/24"));
}

#[test]
fn journal_add_list_delete() {
    let dir = TempDir::new().unwrap();

    lotus_cmd(&dir)
        .args([
            "journal",
            "add",
            "ten quiet minutes before sunrise",
            "--mood",
            "calm",
            "--grateful",
            "tea",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("added entry 1"));

    lotus_cmd(&dir)
        .args(["journal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ten quiet minutes before sunrise"))
        .stdout(predicate::str::contains("mood=calm"));

    lotus_cmd(&dir)
        .args(["journal", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted entry 1"));

    lotus_cmd(&dir)
        .args(["journal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no journal entries)"));
}

#[test]
fn journal_rejects_unknown_mood() {
    let dir = TempDir::new().unwrap();
    lotus_cmd(&dir)
        .args(["journal", "add", "text", "--mood", "hangry"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown mood"));
}

#[test]
fn session_record_updates_stats() {
    let dir = TempDir::new().unwrap();

    lotus_cmd(&dir)
        .args(["session", "record", "breathing", "30", "--soundscape", "rain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recorded 30 min of breathing"))
        .stdout(predicate::str::contains("streak: 1 days"));

    lotus_cmd(&dir)
        .args(["stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total:     30 min"))
        .stdout(predicate::str::contains("sessions:  1"))
        .stdout(predicate::str::contains("phase:     1/24"));
}

#[test]
fn ritual_duplicate_and_limit_wording() {
    let dir = TempDir::new().unwrap();

    lotus_cmd(&dir)
        .args(["ritual", "save", "dawn sit", "mindfulness", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("saved ritual 1"));

    // Same configuration under a different name is still a duplicate.
    lotus_cmd(&dir)
        .args(["ritual", "save", "other name", "mindfulness", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    // Fill the remaining four slots with distinct configurations.
    for minutes in ["11", "12", "13", "14"] {
        lotus_cmd(&dir)
            .args(["ritual", "save", "sit", "mindfulness", minutes])
            .assert()
            .success();
    }

    lotus_cmd(&dir)
        .args(["ritual", "save", "one too many", "mindfulness", "15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("limit"));

    lotus_cmd(&dir)
        .args(["ritual", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dawn sit"));
}

#[test]
fn growth_seed_and_full_bloom() {
    let dir = TempDir::new().unwrap();

    lotus_cmd(&dir)
        .args(["growth", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"phase\": 0"))
        .stdout(predicate::str::contains("\"capReached\": false"));

    lotus_cmd(&dir)
        .args(["growth", "20000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"phase\": 24"))
        .stdout(predicate::str::contains("\"capReached\": true"));
}

#[test]
fn export_import_roundtrip_across_vaults() {
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();

    lotus_cmd(&dir_a)
        .args(["journal", "add", "before the move"])
        .assert()
        .success();
    lotus_cmd(&dir_a)
        .args(["session", "record", "mindfulness", "25"])
        .assert()
        .success();

    let export_path = dir_a.path().join("export.json");
    lotus_cmd(&dir_a)
        .arg("export")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported to"));
    assert!(export_path.exists());

    lotus_cmd(&dir_b)
        .arg("import")
        .arg(&export_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 1 journal entries, 1 sessions, 0 rituals"));

    lotus_cmd(&dir_b)
        .args(["stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total:     25 min"));
    lotus_cmd(&dir_b)
        .args(["journal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("before the move"));
}

#[test]
fn import_failure_messages_are_distinct() {
    let dir = TempDir::new().unwrap();

    // Seed one entry so we can verify nothing is lost.
    lotus_cmd(&dir)
        .args(["journal", "add", "survivor"])
        .assert()
        .success();

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ this is not json").unwrap();
    lotus_cmd(&dir)
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));

    let wrong = dir.path().join("wrong.json");
    std::fs::write(&wrong, r#"{"version": "1.0"}"#).unwrap();
    lotus_cmd(&dir)
        .arg("import")
        .arg(&wrong)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid lotus export"));

    lotus_cmd(&dir)
        .args(["journal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("survivor"));
}

#[test]
fn profile_is_cloud_only() {
    let dir = TempDir::new().unwrap();

    lotus_cmd(&dir)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no profile)"));

    lotus_cmd(&dir)
        .args(["profile", "set", "ana"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("please sign in to use cloud sync"));
}

#[test]
fn missing_required_args() {
    let dir = TempDir::new().unwrap();

    lotus_cmd(&dir)
        .args(["journal", "add"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));

    lotus_cmd(&dir)
        .args(["session", "record"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));

    lotus_cmd(&dir)
        .args(["export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));

    lotus_cmd(&dir)
        .args(["import"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}
