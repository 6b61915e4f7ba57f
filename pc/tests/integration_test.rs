//! Integration tests for the `pc` binary
//!
//! Each test runs the binary inside a temporary working directory holding its
//! own catalog file, with HOME pointed at the same directory so no user config
//! or log file leaks in.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CATALOG: &str = r#"{
    "Writer": {
        "Summarize": {
            "description": "Condense a passage",
            "template": "Summarize: {text}",
            "vars": {"text": "hello"}
        },
        "Tag": {
            "template": "Tone {tone}. Tags: {tags__multi}",
            "vars": {"tone": ["calm", "loud"], "tags__multi": ["A", "B", "C"]}
        },
        "Broken": {"template": "Use {missing_var}", "vars": {}}
    },
    "Coder": {}
}"#;

fn workspace(catalog: Option<&str>) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    if let Some(content) = catalog {
        fs::write(dir.path().join("my_prompts.json"), content).expect("Failed to write catalog");
    }
    dir
}

fn pc(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pc").expect("binary should build");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("XDG_DATA_HOME", dir.join(".local/share"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

// =============================================================================
// Listing
// =============================================================================

#[test]
fn test_categories_in_file_order() {
    let dir = workspace(Some(CATALOG));
    let output = pc(dir.path()).arg("categories").assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).unwrap();

    let writer = text.find("Writer").expect("Writer listed");
    let coder = text.find("Coder").expect("Coder listed");
    assert!(writer < coder);
}

#[test]
fn test_tasks_of_category() {
    let dir = workspace(Some(CATALOG));
    pc(dir.path())
        .args(["tasks", "Writer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summarize"))
        .stdout(predicate::str::contains("Condense a passage"))
        .stdout(predicate::str::contains("Broken"));
}

#[test]
fn test_unknown_category_fails() {
    let dir = workspace(Some(CATALOG));
    pc(dir.path())
        .args(["tasks", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category 'Nope'"));
}

#[test]
fn test_show_lists_variables() {
    let dir = workspace(Some(CATALOG));
    pc(dir.path())
        .args(["show", "Writer", "Tag"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tone {tone}. Tags: {tags__multi}"))
        .stdout(predicate::str::contains("choice"))
        .stdout(predicate::str::contains("multi"))
        .stdout(predicate::str::contains("calm | loud"));
}

#[test]
fn test_modes_listed() {
    let dir = workspace(None);
    pc(dir.path())
        .arg("modes")
        .assert()
        .success()
        .stdout(predicate::str::contains("silent-ack"))
        .stdout(predicate::str::contains("Code Only"));
}

// =============================================================================
// Compose
// =============================================================================

#[test]
fn test_compose_with_defaults() {
    let dir = workspace(Some(CATALOG));
    pc(dir.path())
        .args(["compose", "Writer", "Summarize"])
        .assert()
        .success()
        .stdout("Summarize: hello\n");
}

#[test]
fn test_compose_with_overrides() {
    let dir = workspace(Some(CATALOG));
    pc(dir.path())
        .args(["compose", "Writer", "Tag", "--set", "tone=loud", "--set", "tags__multi=A,C"])
        .assert()
        .success()
        .stdout("Tone loud. Tags: A、C\n");
}

#[test]
fn test_compose_repeated_set_adds_multi_options() {
    let dir = workspace(Some(CATALOG));
    pc(dir.path())
        .args(["compose", "Writer", "Tag", "--set", "tags__multi=B", "--set", "tags__multi=C"])
        .assert()
        .success()
        .stdout("Tone calm. Tags: B、C\n");
}

#[test]
fn test_compose_with_mode_prefix() {
    let dir = workspace(Some(CATALOG));
    pc(dir.path())
        .args(["compose", "Writer", "Summarize", "--mode", "code-only"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("【系統提示】"))
        .stdout(predicate::str::ends_with("----------------\n\nSummarize: hello\n"));
}

#[test]
fn test_compose_roles_wrapper() {
    let dir = workspace(None);
    fs::write(
        dir.path().join("wrapped.json"),
        r#"{"roles": {"Writer": {"Summarize": {"template": "Summarize: {text}", "vars": {"text": "hi"}}}}}"#,
    )
    .unwrap();

    pc(dir.path())
        .args(["--catalog", "wrapped.json", "compose", "Writer", "Summarize"])
        .assert()
        .success()
        .stdout("Summarize: hi\n");
}

#[test]
fn test_compose_missing_variable_fails() {
    let dir = workspace(Some(CATALOG));
    pc(dir.path())
        .args(["compose", "Writer", "Broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing_var"));
}

#[test]
fn test_compose_rejects_value_outside_choices() {
    let dir = workspace(Some(CATALOG));
    pc(dir.path())
        .args(["compose", "Writer", "Tag", "--set", "tone=angry"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'angry' is not an option for 'tone'"));
}

#[test]
fn test_compose_unknown_variable_fails() {
    let dir = workspace(Some(CATALOG));
    pc(dir.path())
        .args(["compose", "Writer", "Summarize", "--set", "nope=1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no variable named 'nope'"));
}

// =============================================================================
// Catalog failures
// =============================================================================

#[test]
fn test_missing_catalog_names_file() {
    let dir = workspace(None);
    pc(dir.path())
        .arg("categories")
        .assert()
        .failure()
        .stderr(predicate::str::contains("my_prompts.json"))
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_malformed_catalog_fails() {
    let dir = workspace(Some("{ not json"));
    pc(dir.path())
        .arg("categories")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON"));
}

// =============================================================================
// Doctor
// =============================================================================

#[test]
fn test_doctor_missing_file() {
    let dir = workspace(None);
    fs::write(dir.path().join("My_Prompts.json"), "{}").unwrap();

    pc(dir.path())
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("My_Prompts.json"))
        .stdout(predicate::str::contains("my_prompts.json not found"))
        .stdout(predicate::str::contains("case-sensitive"));
}

#[test]
fn test_doctor_valid_catalog() {
    let dir = workspace(Some(CATALOG));
    pc(dir.path())
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("my_prompts.json loaded: 2 categories"));
}

#[test]
fn test_doctor_malformed_catalog() {
    let dir = workspace(Some("{ not json"));
    pc(dir.path())
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("is not valid JSON"));
}

#[test]
fn test_doctor_explicit_dir_and_file() {
    let dir = workspace(None);
    let sub = dir.path().join("prompts");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("team.json"), r#"{"A": {}}"#).unwrap();

    pc(dir.path())
        .args(["doctor", "--dir", "prompts", "--file", "team.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("team.json loaded: 1 categories"));
}

// =============================================================================
// Bundled sample
// =============================================================================

#[test]
fn test_demo_catalog_composes() {
    let dir = workspace(None);
    let demo = Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos/my_prompts.json");

    pc(dir.path())
        .arg("--catalog")
        .arg(&demo)
        .args(["compose", "Writer", "Summarize"])
        .assert()
        .success()
        .stdout("Summarize the following text in one sentence for a general audience:\n\nPaste the passage here\n");
}
