use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

const THREADS: &str = "tests/fixtures/threads";
const ANNOTATIONS: &str = "tests/fixtures/annotations.json";

fn filter_json(args: &[&str]) -> Value {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.env_remove("HNJOBS_SERVER_URL");
    cmd.args(["filter", "--path", THREADS, "--format", "json"]);
    cmd.args(args);

    let assert = cmd.assert().success();
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json output")
}

fn match_ids(value: &Value) -> Vec<String> {
    value["matches"]
        .as_array()
        .expect("matches array")
        .iter()
        .map(|m| m["id"].as_str().expect("match id").to_string())
        .collect()
}

#[test]
fn cli_filter_json_applies_hiring_example_query() {
    let value = filter_json(&["python | javascript & remote & ~us-based"]);

    assert_eq!(value["version"], "1.0.0");
    assert_eq!(value["query"], "python | javascript & remote & ~us-based");
    assert_eq!(match_ids(&value), vec!["102", "104"]);
    assert_eq!(value["summary"]["total_jobs"], 7);
    assert_eq!(value["summary"]["total_matches"], 2);
    assert_eq!(value["summary"]["truncated"], false);
    assert_eq!(value["summary"]["message"], "Search results: 2");
}

#[test]
fn cli_filter_without_query_returns_everything() {
    let value = filter_json(&[]);

    assert_eq!(
        match_ids(&value),
        vec!["1001", "1002", "101", "102", "103", "104", "105"]
    );
    assert!(value["summary"].get("message").is_none());
}

#[test]
fn cli_filter_bare_words_match_whole_words_only() {
    let value = filter_json(&["go"]);
    assert_eq!(match_ids(&value), vec!["103"]);

    let value = filter_json(&["goph"]);
    assert!(match_ids(&value).is_empty());

    let value = filter_json(&["\"goph\""]);
    assert_eq!(match_ids(&value), vec!["103"]);
}

#[test]
fn cli_filter_matches_author_field() {
    let value = filter_json(&["initech & ~python"]);
    assert_eq!(match_ids(&value), vec!["103"]);
}

#[test]
fn cli_filter_annotations_feed_notes_and_flags() {
    let value = filter_json(&["--annotations", ANNOTATIONS, "interviewed"]);

    assert_eq!(match_ids(&value), vec!["102"]);
    let first = &value["matches"][0];
    assert_eq!(first["favorite"], true);
    assert_eq!(first["applied"], false);
    assert_eq!(first["note"], "Interviewed with Sam, follow up Friday");
}

#[test]
fn cli_filter_views_select_annotated_postings() {
    let cases: [(&str, Vec<&str>); 6] = [
        ("all", vec!["1001", "1002", "101", "102", "103", "105"]),
        ("favorites", vec!["102"]),
        ("applied", vec!["101"]),
        ("hide-applied", vec!["1001", "1002", "102", "103", "105"]),
        ("notes", vec!["102"]),
        ("hidden", vec!["104"]),
    ];

    for (view, expected) in cases {
        let value = filter_json(&["--annotations", ANNOTATIONS, "--view", view]);
        assert_eq!(match_ids(&value), expected, "view {view}");
    }
}

#[test]
fn cli_filter_thread_and_top_level_only() {
    let value = filter_json(&["--thread", "43861420"]);
    assert_eq!(match_ids(&value), vec!["1001", "1002"]);

    let value = filter_json(&["--top-level-only", "canadians"]);
    assert!(match_ids(&value).is_empty());
}

#[test]
fn cli_filter_limit_truncates_but_counts_all_matches() {
    let value = filter_json(&["remote", "--limit", "1"]);

    assert_eq!(match_ids(&value), vec!["1001"]);
    assert_eq!(value["summary"]["total_matches"], 4);
    assert_eq!(value["summary"]["truncated"], true);
}

#[test]
fn cli_filter_highlight_wraps_matched_terms() {
    let value = filter_json(&["rust", "--highlight"]);

    let highlighted = value["matches"][0]["highlighted"]
        .as_str()
        .expect("highlighted html");
    assert!(highlighted.contains("<span class=\"search-match\">Rust</span> engineer"));
    assert!(highlighted.contains("<p><span class=\"search-match\">Rust</span>, Go"));
}

#[test]
fn cli_filter_text_output_shows_header_body_and_summary() {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.env_remove("HNJOBS_SERVER_URL");
    cmd.args([
        "filter",
        "django",
        "--path",
        THREADS,
        "--annotations",
        ANNOTATIONS,
        "--highlight",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("43884796/101 Acme Corp by acme_hr"))
        .stdout(predicate::str::contains("[applied]"))
        .stdout(predicate::str::contains("**Django**"))
        .stdout(predicate::str::contains("Search results: 1"));
}

#[test]
fn cli_filter_table_output_has_headers() {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.env_remove("HNJOBS_SERVER_URL");
    cmd.args(["filter", "globex", "--path", THREADS, "--format", "table"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("THREAD"))
        .stdout(predicate::str::contains("TITLE"))
        .stdout(predicate::str::contains("Globex"))
        .stdout(predicate::str::contains("JavaScript wizard").not());
}

#[test]
fn cli_filter_text_output_reports_no_matches() {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.env_remove("HNJOBS_SERVER_URL");
    cmd.args(["filter", "cobol", "--path", THREADS]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No matches found!"))
        .stdout(predicate::str::contains("Search results: 0"));
}

#[test]
fn cli_filter_category_sets_match_titles() {
    let value = filter_json(&["initech"]);
    assert_eq!(value["matches"][0]["title"], "Initech");

    let value = filter_json(&["initech", "--category", "hired"]);
    assert_eq!(value["matches"][0]["title"], "SEEKING WORK");

    let value = filter_json(&["initech", "--category", "freelance"]);
    assert_eq!(value["matches"][0]["title"], "Title Not Found");
}

#[test]
fn cli_filter_missing_path_fails() {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.env_remove("HNJOBS_SERVER_URL");
    cmd.args(["filter", "rust", "--path", "tests/fixtures/nope"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("thread path does not exist"));
}

#[test]
fn cli_filter_rejects_zero_limit() {
    let mut cmd = cargo_bin_cmd!("hnjobs");
    cmd.env_remove("HNJOBS_SERVER_URL");
    cmd.args(["filter", "rust", "--path", THREADS, "--limit", "0"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--limit must be greater than zero"));
}
