use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn hhlex(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("hhlex");
    cmd.current_dir(dir);
    cmd
}

#[test]
fn tokens_simple_format() {
    let dir = TempDir::new().unwrap();
    let source = write_file(&dir, "a.php", "<?hh $a;");

    hhlex(dir.path())
        .arg("tokens")
        .arg(&source)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("0:0 \"<?hh\" punctuation.section.embedded.begin.php")
                .and(predicate::str::contains("0:6 \"a\" variable.other.php"))
                .and(predicate::str::contains("hint 0:0-0:8 Unterminated embedded code block")),
        );
}

#[test]
fn tokens_without_diagnostics() {
    let dir = TempDir::new().unwrap();
    let source = write_file(&dir, "a.php", "<?hh $a;");

    hhlex(dir.path())
        .arg("tokens")
        .arg(&source)
        .arg("--no-diagnostics")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unterminated").not());
}

#[test]
fn tokens_json_format() {
    let dir = TempDir::new().unwrap();
    let source = write_file(&dir, "a.php", "<p>\n<?hh echo 1; ?>");

    let output = hhlex(dir.path())
        .arg("tokens")
        .arg(&source)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["lines"].as_array().unwrap().len(), 2);
    assert_eq!(value["lines"][1]["tokens"][2]["value"], "echo");
}

#[test]
fn tokens_unknown_format_fails() {
    let dir = TempDir::new().unwrap();
    let source = write_file(&dir, "a.php", "<?hh");

    hhlex(dir.path())
        .arg("tokens")
        .arg(&source)
        .args(["-f", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn format_from_config_file() {
    let dir = TempDir::new().unwrap();
    let source = write_file(&dir, "a.php", "<?hh 1");
    let config = write_file(&dir, "custom.toml", "[output]\nformat = \"scopes\"\n");

    hhlex(dir.path())
        .arg("tokens")
        .arg(&source)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "text.html.hack meta.embedded.block.php source.hack constant.numeric.php",
        ));
}

#[test]
fn open_tags_from_project_config() {
    let dir = TempDir::new().unwrap();
    let source = write_file(&dir, "a.php", "<?hh $a");
    write_file(&dir, "hhlex.toml", "[lexer]\nopen_tags = [\"<?php\"]\n");

    hhlex(dir.path())
        .arg("tokens")
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("0:0 \"<?hh $a\" text.html.hack"));
}

#[test]
fn scope_at_position() {
    let dir = TempDir::new().unwrap();
    let source = write_file(&dir, "a.php", "<?hh\n// note");

    hhlex(dir.path())
        .arg("scope")
        .arg(&source)
        .args(["--line", "1", "--column", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("comment.line.double-slash.php"));
}

#[test]
fn scope_past_end_of_file_fails() {
    let dir = TempDir::new().unwrap();
    let source = write_file(&dir, "a.php", "<?hh");

    hhlex(dir.path())
        .arg("scope")
        .arg(&source)
        .args(["--line", "5", "--column", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("past the end"));
}

#[test]
fn diagnostics_exit_code_follows_severity() {
    let dir = TempDir::new().unwrap();
    let clean = write_file(&dir, "clean.php", "<?hh $a = 1;");
    let broken = write_file(&dir, "broken.php", "<?hh\n$a = \"open");

    hhlex(dir.path())
        .arg("diagnostics")
        .arg(&clean)
        .assert()
        .success()
        .stdout(predicate::str::contains("hint"));

    hhlex(dir.path())
        .arg("diagnostics")
        .arg(&broken)
        .assert()
        .failure()
        .stdout(predicate::str::contains("error 1:0-1:10 Unterminated string literal"));
}

#[test]
fn check_passing_fixtures() {
    hhlex(Path::new(env!("CARGO_MANIFEST_DIR")))
        .arg("check")
        .arg(fixture_path("embedding.php"))
        .arg(fixture_path("strings.php"))
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS").count(2));
}

#[test]
fn check_reports_failing_assertions() {
    let dir = TempDir::new().unwrap();
    let fixture = write_file(
        &dir,
        "bad.php",
        "// SYNTAX TEST \"text.html.hack\"\n<?hh $x;\n//    ^ constant.numeric.php\n",
    );
    let malformed = write_file(&dir, "malformed.php", "<?hh\n");

    hhlex(dir.path())
        .arg("check")
        .arg(&fixture)
        .arg(&malformed)
        .assert()
        .failure()
        .stdout(
            predicate::str::contains("FAIL")
                .and(predicate::str::contains("1 of 1 checks"))
                .and(predicate::str::contains("missing constant.numeric.php"))
                .and(predicate::str::contains("ERROR")),
        );
}
