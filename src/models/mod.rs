//! Shared data models for queries, job postings, filter configs and
//! results.
//!
//! These types form the stable JSON API surface used by the CLI
//! and the HTTP daemon.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Schema version for `FilterResult` JSON payloads.
///
/// This version follows semver semantics (MAJOR.MINOR.PATCH):
/// - MAJOR: Breaking changes to required fields or field semantics.
/// - MINOR: Backward-compatible additions (new optional fields).
/// - PATCH: Documentation or internal changes only.
pub const FILTER_RESULT_VERSION: &str = "1.0.0";

/// Schema version for `ParseResult` JSON payloads.
///
/// Independent from `FILTER_RESULT_VERSION` since parse responses use
/// a separate top-level schema.
pub const PARSE_RESULT_VERSION: &str = "1.0.0";

/// Boolean combinator between two terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    /// `|`
    Or,
    /// `&`
    And,
}

impl Operator {
    /// Surface syntax for this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Or => "|",
            Operator::And => "&",
        }
    }

    /// Combine a running result with the next term's truth value.
    pub fn apply(self, lhs: bool, rhs: bool) -> bool {
        match self {
            Operator::Or => lhs || rhs,
            Operator::And => lhs && rhs,
        }
    }
}

/// A single search word or quoted phrase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    /// Match text, unwrapped of quotes and lowercased. Never empty.
    pub text: String,
    /// `true` for a quoted phrase (substring match), `false` for a
    /// bare word (whole-word match).
    pub exact: bool,
    /// `true` when the term was prefixed with `~`.
    pub negated: bool,
}

/// One element of a parsed query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Token {
    Operator(Operator),
    Term(Term),
}

/// Ordered token sequence produced by the tokenizer.
///
/// Order is load-bearing: evaluation folds the terms left to right
/// using the operators that sit between them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    tokens: Vec<Token>,
}

impl Query {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over the terms, skipping operators.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Term(term) => Some(term),
            Token::Operator(_) => None,
        })
    }

    /// Whether the query filters anything at all.
    pub fn has_terms(&self) -> bool {
        self.terms().next().is_some()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

impl<'a> IntoIterator for &'a Query {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Visual category of a query chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayKind {
    Operator,
    Word,
    Phrase,
}

/// Read-only breakdown of a raw query, one entry per raw token.
///
/// Unlike `Query`, this keeps tokens that carry no match text (an
/// empty phrase or a bare `~`) so that a UI can show what was typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayToken {
    pub kind: DisplayKind,
    /// Text as typed (quotes and `~` stripped, casing preserved).
    /// Empty phrases carry the placeholder `""`.
    pub text: String,
    #[serde(default)]
    pub negated: bool,
}

/// Request body for `POST /v1/parse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseRequest {
    pub query: String,
}

/// Result of parsing a raw query for display and inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub version: String,
    pub query: String,
    pub tokens: Query,
    pub display: Vec<DisplayToken>,
}

/// Thread category, each with its own thread title search and example
/// query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Hiring,
    Hired,
    Freelance,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Hiring, Category::Hired, Category::Freelance];

    pub fn key(self) -> &'static str {
        match self {
            Category::Hiring => "hiring",
            Category::Hired => "hired",
            Category::Freelance => "freelance",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Hiring => "Who is Hiring?",
            Category::Hired => "Who Wants to be Hired?",
            Category::Freelance => "Freelancer? Seeking freelancer?",
        }
    }

    /// Search string used to locate this category's monthly threads.
    pub fn thread_query(self) -> &'static str {
        match self {
            Category::Hiring => "\"Ask HN: Who is hiring?\"",
            Category::Hired => "\"Ask HN: Who wants to be hired?\"",
            Category::Freelance => "\"Ask HN: Freelancer?\"",
        }
    }

    pub fn example_query(self) -> &'static str {
        match self {
            Category::Hiring => "python | javascript & remote & ~us-based",
            Category::Hired | Category::Freelance => "dheerajck18@gmail.com & python",
        }
    }

    /// Card title for a posting, given its plain text (tags stripped,
    /// paragraphs on separate lines).
    ///
    /// - `Hiring`: the first line up to the first `|`, trimmed. Anything
    ///   shorter than 2 or longer than 80 characters becomes `Job Post`.
    /// - `Hired`: always `SEEKING WORK`.
    /// - `Freelance`: whichever of `SEEKING WORK` / `SEEKING FREELANCER`
    ///   the text contains, checked in that order.
    pub fn posting_title(self, plain_text: &str) -> String {
        match self {
            Category::Hiring => {
                let first_line = plain_text.lines().next().unwrap_or_default();
                let title = first_line.split('|').next().unwrap_or_default().trim();
                let len = title.chars().count();
                if (MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&len) {
                    title.to_string()
                } else {
                    "Job Post".to_string()
                }
            }
            Category::Hired => "SEEKING WORK".to_string(),
            Category::Freelance if plain_text.contains("SEEKING WORK") => {
                "SEEKING WORK".to_string()
            }
            Category::Freelance if plain_text.contains("SEEKING FREELANCER") => {
                "SEEKING FREELANCER".to_string()
            }
            Category::Freelance => "Title Not Found".to_string(),
        }
    }
}

const MIN_TITLE_CHARS: usize = 2;
const MAX_TITLE_CHARS: usize = 80;

/// A top-level comment in a thread, i.e. one job posting (or one
/// candidate, for "who wants to be hired" threads).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    /// Identifier of the thread this posting belongs to; annotation
    /// lookups are keyed by it.
    pub thread_id: String,
    pub author: String,
    /// Comment body as HTML.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_title: Option<String>,
}

/// Annotation-based view applied before the search query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterView {
    /// Everything that is not hidden.
    #[default]
    All,
    Favorites,
    Applied,
    /// Everything not applied to and not hidden.
    HideApplied,
    /// Postings carrying a non-blank note.
    Notes,
    /// Hidden postings only.
    Hidden,
}

/// Configuration for a filter pass over saved thread dumps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Raw query string as typed by the user.
    #[serde(default)]
    pub query: String,
    /// Thread dump files or directories containing them.
    pub paths: Vec<PathBuf>,
    #[serde(default)]
    pub globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    /// Annotation export (favorites, applied, hidden, notes).
    #[serde(default)]
    pub annotations: Option<PathBuf>,
    /// Restrict results to one thread.
    #[serde(default)]
    pub thread: Option<String>,
    /// Kind of thread being filtered; decides how match titles are
    /// derived.
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub view: FilterView,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Attach highlighted HTML to every match.
    #[serde(default)]
    pub highlight: bool,
    /// Keep only direct replies to the thread.
    #[serde(default)]
    pub top_level_only: bool,
}

/// A posting that passed the view and the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatch {
    #[serde(flatten)]
    pub job: JobPosting,
    /// Card title derived from the posting text per `Category`.
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub applied: bool,
    #[serde(default)]
    pub hidden: bool,
    /// Comment body with `<span class="search-match">` wrappers around
    /// matched terms. Present only when highlighting was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<String>,
}

/// Aggregate counts for a filter pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSummary {
    /// Postings loaded before any filtering.
    pub total_jobs: u64,
    /// Postings that passed the view and the query.
    pub total_matches: u64,
    /// `true` when `limit` cut the returned matches short.
    pub truncated: bool,
    /// `Search results: N`, present only when a query was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of a filter pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResult {
    pub version: String,
    pub query: String,
    pub tokens: Query,
    pub matches: Vec<JobMatch>,
    pub summary: FilterSummary,
}
