use assert_cmd::Command;
use serde_json::Value;

fn frame(body: &str) -> Vec<u8> {
    let mut bytes = (body.len() as u32).to_ne_bytes().to_vec();
    bytes.extend_from_slice(body.as_bytes());
    bytes
}

fn frames(mut stdout: &[u8]) -> Vec<Value> {
    let mut out = Vec::new();
    while stdout.len() >= 4 {
        let len = u32::from_ne_bytes([stdout[0], stdout[1], stdout[2], stdout[3]]) as usize;
        out.push(serde_json::from_slice(&stdout[4..4 + len]).expect("json frame"));
        stdout = &stdout[4 + len..];
    }
    assert!(stdout.is_empty(), "trailing bytes on stdout");
    out
}

fn native_host(log_dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("formfill-native-host"));
    cmd.env("FORMFILL_LOG_DIR", log_dir.path())
        .env("XDG_CONFIG_HOME", log_dir.path());
    cmd
}

#[test]
fn cli_exits_one_on_missing_payload_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");

    let assert = Command::new(assert_cmd::cargo::cargo_bin!("formfill"))
        .env("XDG_CONFIG_HOME", dir.path())
        .arg(&missing)
        .assert()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("Failed to load payload"), "stderr: {stderr}");
}

#[test]
fn cli_rejects_unknown_page() {
    Command::new(assert_cmd::cargo::cargo_bin!("formfill"))
        .args(["payload.json", "--page", "3"])
        .assert()
        .failure();
}

#[test]
fn native_host_exits_zero_on_immediate_eof() {
    let dir = tempfile::tempdir().unwrap();
    let assert = native_host(&dir).write_stdin(Vec::new()).assert().success();
    assert!(assert.get_output().stdout.is_empty());
    assert!(dir.path().join("native_host.log").exists());
}

#[test]
fn native_host_answers_malformed_message_once() {
    let dir = tempfile::tempdir().unwrap();
    let assert = native_host(&dir)
        .write_stdin(frame("{\"url\": "))
        .assert()
        .success();

    let replies = frames(&assert.get_output().stdout);
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["status"], "error");
    assert!(replies[0]["message"]
        .as_str()
        .unwrap()
        .starts_with("Error decoding JSON: "));
}

#[test]
fn native_host_fails_on_truncated_frame() {
    let dir = tempfile::tempdir().unwrap();
    let mut input = 64u32.to_ne_bytes().to_vec();
    input.extend_from_slice(b"{\"url\"");
    native_host(&dir).write_stdin(input).assert().code(1);
}
