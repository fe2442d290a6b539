//! Parse and filter entry points.
//!
//! These functions provide the "filter as a function" API used by the
//! CLI and the HTTP daemon.

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::annotations::{Annotations, ThreadAnnotations};
use crate::models::{
    FilterConfig, FilterResult, FilterSummary, FilterView, JobMatch, ParseResult,
    FILTER_RESULT_VERSION, PARSE_RESULT_VERSION,
};
use crate::search::highlight::highlight_html;
use crate::search::query::{parse, parse_display, MatchContext};
use crate::search::text::plain_text;
use crate::threads;

/// Parse a raw query into evaluable tokens and display chips.
pub fn run_parse(query: &str) -> ParseResult {
    ParseResult {
        version: PARSE_RESULT_VERSION.to_string(),
        query: query.to_string(),
        tokens: parse(query),
        display: parse_display(query),
    }
}

/// Load postings, apply the annotation view, then the query.
///
/// Every admitted posting is counted; at most `limit` of them are
/// returned.
pub fn run_filter(config: FilterConfig) -> Result<FilterResult> {
    if config.paths.is_empty() {
        bail!("at least one thread path is required");
    }

    for path in &config.paths {
        if !path.exists() {
            bail!("thread path does not exist: {}", path.display());
        }
    }

    let annotations = match &config.annotations {
        Some(path) => Annotations::load(path)?,
        None => Annotations::default(),
    };

    let postings = threads::load_postings(&config)?;
    let total_jobs = postings.len() as u64;

    let query = parse(&config.query);
    let filter_by_query = query.has_terms();
    debug!(tokens = query.len(), "parsed query {:?}", config.query);

    let limit = config.limit.unwrap_or(usize::MAX);
    let mut matches = Vec::new();
    let mut total_matches: u64 = 0;

    for job in postings {
        if let Some(thread) = &config.thread {
            if &job.thread_id != thread {
                continue;
            }
        }

        let marks = annotations.for_thread(&job.thread_id);
        if !view_admits(config.view, &marks, &job.id) {
            continue;
        }

        let note = marks.note(&job.id);
        if filter_by_query {
            let body = job.text.to_lowercase();
            let author = job.author.to_lowercase();
            let note_text = note.unwrap_or_default().to_lowercase();
            let ctx = MatchContext::from_lowercase(&body, &author, &note_text);
            if !ctx.matches(&query) {
                continue;
            }
        }

        total_matches += 1;
        if matches.len() >= limit {
            continue;
        }

        let highlighted = config
            .highlight
            .then(|| highlight_html(&job.text, &query));

        let title = config.category.posting_title(&plain_text(&job.text));

        matches.push(JobMatch {
            title,
            note: note.filter(|n| !n.trim().is_empty()).map(str::to_string),
            favorite: marks.is_favorite(&job.id),
            applied: marks.is_applied(&job.id),
            hidden: marks.is_hidden(&job.id),
            highlighted,
            job,
        });
    }

    let truncated = total_matches > matches.len() as u64;
    let message = (!config.query.trim().is_empty())
        .then(|| format!("Search results: {total_matches}"));

    info!(
        total_jobs,
        total_matches, truncated, "filtered postings with view {:?}", config.view
    );

    Ok(FilterResult {
        version: FILTER_RESULT_VERSION.to_string(),
        query: config.query,
        tokens: query,
        matches,
        summary: FilterSummary {
            total_jobs,
            total_matches,
            truncated,
            message,
        },
    })
}

/// Whether a posting is visible under the given annotation view.
///
/// Hidden postings only ever appear in the `Hidden` view.
pub fn view_admits(view: FilterView, marks: &ThreadAnnotations<'_>, job_id: &str) -> bool {
    let hidden = marks.is_hidden(job_id);
    match view {
        FilterView::All => !hidden,
        FilterView::Favorites => marks.is_favorite(job_id) && !hidden,
        FilterView::Applied => marks.is_applied(job_id) && !hidden,
        FilterView::HideApplied => !marks.is_applied(job_id) && !hidden,
        FilterView::Notes => marks.has_note(job_id) && !hidden,
        FilterView::Hidden => hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use std::path::PathBuf;

    fn fixture_config(query: &str) -> FilterConfig {
        FilterConfig {
            query: query.to_string(),
            paths: vec![PathBuf::from("tests/fixtures/threads")],
            globs: Vec::new(),
            exclude_globs: Vec::new(),
            annotations: Some(PathBuf::from("tests/fixtures/annotations.json")),
            thread: None,
            category: Default::default(),
            view: FilterView::All,
            limit: None,
            highlight: false,
            top_level_only: false,
        }
    }

    fn ids(result: &FilterResult) -> Vec<&str> {
        result.matches.iter().map(|m| m.job.id.as_str()).collect()
    }

    #[test]
    fn empty_query_returns_all_visible_postings() {
        let result = run_filter(fixture_config("")).expect("filter");
        assert_eq!(result.summary.total_jobs, 7);
        assert_eq!(ids(&result), vec!["1001", "1002", "101", "102", "103", "105"]);
        assert!(result.summary.message.is_none());
    }

    #[test]
    fn example_query_filters_postings() {
        let result =
            run_filter(fixture_config("python | javascript & remote & ~us-based")).expect("filter");
        assert_eq!(ids(&result), vec!["102"]);
        assert_eq!(result.summary.message.as_deref(), Some("Search results: 1"));
        assert_eq!(result.tokens.len(), 7);
    }

    #[test]
    fn query_matches_notes_and_authors() {
        let by_note = run_filter(fixture_config("interviewed")).expect("filter");
        assert_eq!(ids(&by_note), vec!["102"]);
        assert_eq!(
            by_note.matches[0].note.as_deref(),
            Some("Interviewed with Sam, follow up Friday")
        );

        let by_author = run_filter(fixture_config("initech")).expect("filter");
        assert_eq!(ids(&by_author), vec!["103"]);
    }

    #[test]
    fn whole_word_and_phrase_rules_apply() {
        let go = run_filter(fixture_config("go")).expect("filter");
        assert_eq!(ids(&go), vec!["103"]);

        let phrase = run_filter(fixture_config("\"python developer\"")).expect("filter");
        assert_eq!(ids(&phrase), vec!["101"]);
    }

    #[test]
    fn views_follow_annotations() {
        let cases = [
            (FilterView::Favorites, vec!["102"]),
            (FilterView::Applied, vec!["101"]),
            (FilterView::HideApplied, vec!["1001", "1002", "102", "103", "105"]),
            (FilterView::Notes, vec!["102"]),
            (FilterView::Hidden, vec!["104"]),
        ];

        for (view, expected) in cases {
            let mut config = fixture_config("");
            config.view = view;
            let result = run_filter(config).expect("filter");
            assert_eq!(ids(&result), expected, "view {view:?}");
        }
    }

    #[test]
    fn thread_and_top_level_filters() {
        let mut config = fixture_config("");
        config.thread = Some("43861420".to_string());
        assert_eq!(ids(&run_filter(config).expect("filter")), vec!["1001", "1002"]);

        let mut config = fixture_config("");
        config.top_level_only = true;
        let result = run_filter(config).expect("filter");
        assert!(!ids(&result).contains(&"105"));
    }

    #[test]
    fn limit_truncates_but_counts_everything() {
        let mut config = fixture_config("remote");
        config.limit = Some(1);
        let result = run_filter(config).expect("filter");
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.summary.total_matches, 3);
        assert!(result.summary.truncated);
    }

    #[test]
    fn highlight_attaches_marked_html() {
        let mut config = fixture_config("rust");
        config.highlight = true;
        let result = run_filter(config).expect("filter");
        let highlighted = result.matches[0].highlighted.as_deref().expect("highlighted");
        assert!(highlighted.contains("<span class=\"search-match\">Rust</span> engineer"));
    }

    #[test]
    fn matches_carry_category_titles() {
        let result = run_filter(fixture_config("")).expect("filter");
        let titles: Vec<&str> = result.matches.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Old Job 1: C++ developer. Remote.",
                "Old Job 2: QA tester. On-site.",
                "Acme Corp",
                "Globex",
                "Initech",
                "Is this role open to Canadians?",
            ]
        );

        let mut config = fixture_config("");
        config.category = Category::Hired;
        let result = run_filter(config).expect("filter");
        assert!(result.matches.iter().all(|m| m.title == "SEEKING WORK"));
    }

    #[test]
    fn missing_path_is_an_error() {
        let mut config = fixture_config("");
        config.paths = vec![PathBuf::from("definitely/does/not/exist")];
        let err = run_filter(config).expect_err("expected error");
        assert!(format!("{err}").contains("thread path does not exist"));
    }

    #[test]
    fn run_parse_returns_tokens_and_chips() {
        let result = run_parse("rust ~\"\"");
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.display.len(), 2);
        assert_eq!(result.version, PARSE_RESULT_VERSION);
    }
}
