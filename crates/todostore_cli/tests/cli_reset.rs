use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("todostore-{nanos}-{file_name}"))
}

fn run(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_todostore"))
        .args(args)
        .env("TODOSTORE_DATA_DIR", data_dir)
        .env("TODOSTORE_CONFIG_PATH", data_dir.join("config.json"))
        .env_remove("TODOSTORE_SEED_PATH")
        .output()
        .expect("failed to run todostore")
}

fn add(data_dir: &Path, name: &str, due: &str) -> i64 {
    let output = run(
        data_dir,
        &["add", name, "-d", "details", "--due", due, "--json"],
    );
    assert!(output.status.success());
    let task: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    task["id"].as_i64().unwrap()
}

fn list_json(data_dir: &Path, tab: &str) -> Vec<serde_json::Value> {
    let output = run(data_dir, &["list", tab, "--json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    value.as_array().unwrap().clone()
}


#[test]
fn reset_requires_confirmation() {
    let data_dir = temp_path("cli-reset-unconfirmed");
    add(&data_dir, "Keep me", "2024-01-01");
    let output = run(&data_dir, &["reset"]);
    let tasks = list_json(&data_dir, "all");
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--yes"));
    assert_eq!(tasks.len(), 1);
}

#[test]
fn reset_discards_every_task() {
    let data_dir = temp_path("cli-reset");
    add(&data_dir, "One", "2024-01-01");
    add(&data_dir, "Two", "2024-01-01");

    let output = run(&data_dir, &["reset", "--yes"]);
    let tasks = list_json(&data_dir, "all");
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(output.status.success());
    assert!(tasks.is_empty());
}
