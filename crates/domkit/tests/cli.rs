// ABOUTME: Integration tests for the domkit CLI binary.
// ABOUTME: Covers sanitize, relatives, distance and ancestor subcommands plus error exits.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn domkit_cmd() -> Command {
    Command::cargo_bin("domkit").unwrap()
}

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Test Page</title></head>
<body>
<section class="card" id="first"><h2>One</h2><button id="go" onclick="go()">Go</button></section>
<section class="card" id="second"><h2>Two</h2></section>
<script>alert(1)</script>
</body>
</html>"#;

fn write_page(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("page.html");
    fs::write(&path, PAGE).unwrap();
    path
}

#[test]
fn sanitize_document_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_page(&temp_dir);

    domkit_cmd()
        .arg("sanitize")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<button id="go">Go</button>"#))
        .stdout(predicate::str::contains("alert(1)").not())
        .stdout(predicate::str::contains("DOCTYPE").not());
}

#[test]
fn sanitize_fragment_to_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("frag.html");
    let output = temp_dir.path().join("clean.html");
    fs::write(
        &input,
        r#"<div hidden="weird" onclick="x()"><a href="javascript:y()">t</a></div>"#,
    )
    .unwrap();

    domkit_cmd()
        .arg("sanitize")
        .arg(&input)
        .arg("--fragment")
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        r#"<div hidden=""><a>t</a></div>"#
    );
}

#[test]
fn sanitize_keep_invalid_booleans() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("frag.html");
    fs::write(&input, r#"<p hidden="weird">x</p>"#).unwrap();

    domkit_cmd()
        .args(["sanitize", "--fragment", "--keep-invalid-booleans"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"hidden="weird""#));
}

#[test]
fn sanitize_from_stdin() {
    assert_cmd::Command::cargo_bin("domkit")
        .unwrap()
        .args(["sanitize", "--fragment", "-"])
        .write_stdin("<b onmouseover=\"x\">bold</b><script>x</script>")
        .assert()
        .success()
        .stdout("<b>bold</b>\n");
}

#[test]
fn relatives_prints_nearest() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_page(&temp_dir);

    domkit_cmd()
        .args(["relatives", "--origin", "#go", "--selector", "h2"])
        .arg(&path)
        .assert()
        .success()
        .stdout("<h2>One</h2>\n");
}

#[test]
fn relatives_json_with_context() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_page(&temp_dir);

    let output = domkit_cmd()
        .args([
            "relatives",
            "--origin",
            "#go",
            "--selector",
            "h2",
            "--context",
            "#second",
            "--json",
        ])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let matches = value.as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["tag"], "h2");
    assert_eq!(matches[0]["html"], "<h2>Two</h2>");
}

#[test]
fn distance_between_elements() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_page(&temp_dir);

    domkit_cmd()
        .args(["distance", "--from", "#first", "--to", "#first h2"])
        .arg(&path)
        .assert()
        .success()
        .stdout("1\n");

    domkit_cmd()
        .args(["distance", "--from", "#go", "--to", "#first", "--json"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"distance":1}"#));
}

#[test]
fn ancestor_lookup() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_page(&temp_dir);

    domkit_cmd()
        .args(["ancestor", "--origin", "#go", "--selector", ".card"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(r#"<section class="card" id="first">"#));

    domkit_cmd()
        .args(["ancestor", "--origin", "#go", "--selector", "table", "--json"])
        .arg(&path)
        .assert()
        .success()
        .stdout("null\n");
}

#[test]
fn invalid_selector_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_page(&temp_dir);

    domkit_cmd()
        .args(["relatives", "--origin", "#go", "--selector", "h2["])
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid selector"));
}

#[test]
fn missing_origin_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_page(&temp_dir);

    domkit_cmd()
        .args(["distance", "--from", "#nope", "--to", "h2"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("matched nothing"));
}

#[test]
fn missing_file_fails() {
    domkit_cmd()
        .args(["sanitize", "/definitely/not/here.html"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to read"));
}
