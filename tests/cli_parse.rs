use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn cli_parse_text_renders_chips() {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.args(["parse", "python | ~java \"on site\""]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("word python"))
        .stdout(predicate::str::contains("OR"))
        .stdout(predicate::str::contains("~word java"))
        .stdout(predicate::str::contains("phrase \"on site\""));
}

#[test]
fn cli_parse_json_reports_tokens_and_display() {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.args(["parse", "Python & ~\"US Based\"", "--format", "json"]);

    let assert = cmd.assert().success();
    let value: Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid json output");

    assert_eq!(value["version"], "1.0.0");
    assert_eq!(value["query"], "Python & ~\"US Based\"");

    let tokens = value["tokens"].as_array().expect("tokens array");
    assert_eq!(tokens.len(), 3);

    assert_eq!(tokens[0]["type"], "term");
    assert_eq!(tokens[0]["value"]["text"], "python");
    assert_eq!(tokens[0]["value"]["exact"], false);
    assert_eq!(tokens[0]["value"]["negated"], false);

    assert_eq!(tokens[1]["type"], "operator");
    assert_eq!(tokens[1]["value"], "AND");

    assert_eq!(tokens[2]["value"]["text"], "us based");
    assert_eq!(tokens[2]["value"]["exact"], true);
    assert_eq!(tokens[2]["value"]["negated"], true);

    let display = value["display"].as_array().expect("display array");
    assert_eq!(display.len(), 3);
    assert_eq!(display[2]["kind"], "phrase");
    assert_eq!(display[2]["text"], "US Based");
}

#[test]
fn cli_parse_empty_phrase_keeps_placeholder_chip() {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.args(["parse", "rust \"\"", "--format", "json"]);

    let assert = cmd.assert().success();
    let value: Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid json output");

    assert_eq!(value["tokens"].as_array().expect("tokens array").len(), 1);

    let display = value["display"].as_array().expect("display array");
    assert_eq!(display.len(), 2);
    assert_eq!(display[1]["text"], "\"\"");
}

#[test]
fn cli_parse_uses_category_example_query() {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.args(["parse", "--category", "hiring", "--format", "json"]);

    let assert = cmd.assert().success();
    let value: Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid json output");

    assert_eq!(value["query"], "python | javascript & remote & ~us-based");
    assert_eq!(value["tokens"].as_array().expect("tokens array").len(), 7);
}

#[test]
fn cli_parse_without_query_or_category_fails() {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.arg("parse");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("a query or --category is required"));
}

#[test]
fn cli_schema_version_prints_version() {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.arg("--schema-version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Filter result JSON schema version: 1.0.0",
        ));
}

#[test]
fn cli_categories_json_lists_all_categories() {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.args(["categories", "--format", "json"]);

    let assert = cmd.assert().success();
    let value: Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid json output");

    let categories = value.as_array().expect("categories array");
    let keys: Vec<&str> = categories
        .iter()
        .map(|c| c["category"].as_str().expect("category key"))
        .collect();
    assert_eq!(keys, vec!["hiring", "hired", "freelance"]);
}
