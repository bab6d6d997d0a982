use assert_cmd::Command;
use predicates::prelude::*;

fn tubescript() -> Command {
    Command::cargo_bin("tubescript").unwrap()
}

#[test]
fn help_lists_commands() {
    tubescript()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn analyze_help_lists_options() {
    tubescript()
        .args(["analyze", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--chunk-size"))
        .stdout(predicate::str::contains("--boundary"))
        .stdout(predicate::str::contains("--transcript-out"));
}

#[test]
fn invalid_url_is_rejected() {
    tubescript()
        .args(["analyze", "https://example.com/not-a-video"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("valid YouTube video URL"));
}

#[test]
fn analyze_without_input_fails() {
    tubescript().arg("analyze").assert().failure();
}

#[test]
fn unknown_format_is_rejected() {
    tubescript()
        .args(["analyze", "dQw4w9WgXcQ", "--format", "srt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn transcript_file_takes_a_single_video() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("abc.json");
    fs_err::write(&path, r#"[{"text": "hello", "start": 0.0, "duration": 1.0}]"#).unwrap();

    tubescript()
        .args(["analyze", "dQw4w9WgXcQ", "9bZkp7q19f0", "--transcript-file"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--transcript-file holds one video"));
}
