use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("todostore-{nanos}-{file_name}"))
}

#[test]
fn interactive_session_refreshes_list_after_each_change() {
    let data_dir = temp_path("cli-interactive");
    let mut child = Command::new(env!("CARGO_BIN_EXE_todostore"))
        .env("TODOSTORE_DATA_DIR", &data_dir)
        .env("TODOSTORE_CONFIG_PATH", data_dir.join("config.json"))
        .env_remove("TODOSTORE_SEED_PATH")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start interactive session");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        writeln!(stdin, r#"add "Buy milk" -d "2%" --due 2999-01-01"#).unwrap();
        writeln!(stdin, "done 1").unwrap();
        writeln!(stdin, "bogus").unwrap();
        writeln!(stdin, "exit").unwrap();
    }

    let output = child.wait_with_output().expect("interactive session output");
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Open (0)"));
    assert!(stdout.contains("Added task: Buy milk (1)"));
    assert!(stdout.contains("Open (1)"));
    assert!(stdout.contains("Completed task: Buy milk (1)"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}
