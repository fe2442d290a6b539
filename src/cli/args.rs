use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use crate::models::{Category, FilterConfig, FilterView};

/// Top-level CLI entrypoint for `hnjobs`.
#[derive(Parser, Debug)]
#[command(
    name = "hnjobs",
    about = "Search saved Hacker News hiring threads with a boolean query language",
    author = "hnjobs developers",
    subcommand_required = false,
    arg_required_else_help = false
)]
pub struct Cli {
    /// Print the JSON schema version used for `--format=json` output
    /// and exit.
    #[arg(long = "schema-version")]
    pub schema_version: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show how a query is tokenized.
    Parse(ParseArgs),
    /// Filter postings from saved thread dumps.
    Filter(FilterArgs),
    /// List thread categories and their example queries.
    Categories(CategoriesArgs),
    /// Run a long-lived HTTP+JSON daemon.
    Serve(ServeArgs),
}

/// Arguments specific to the `parse` subcommand.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Query to tokenize, e.g. `python | javascript & ~us-based`.
    ///
    /// When omitted, the example query of `--category` is used.
    pub query: Option<String>,

    /// Category whose example query is parsed when no query is given.
    #[arg(long = "category", value_enum)]
    pub category: Option<CategoryArg>,

    /// Output format (text, table, or json).
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Optional server URL for delegating parsing to a daemon.
    #[arg(long = "server", env = "HNJOBS_SERVER_URL")]
    pub server: Option<String>,

    /// Disable use of any configured server and force local parsing.
    #[arg(long = "no-server")]
    pub no_server: bool,
}

/// Arguments specific to the `filter` subcommand.
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Search query. Bare words match whole words, `"quoted phrases"`
    /// match anywhere, `~` negates, `|` is OR and `&` is AND. Terms are
    /// combined strictly left to right; adjacent terms are ANDed.
    pub query: Option<String>,

    /// Thread dump files or directories (defaults to the current
    /// directory if omitted).
    #[arg(short = 'p', long = "path")]
    pub paths: Vec<PathBuf>,

    /// Inclusion globs applied to candidate files. Without any, only
    /// `*.json` files are read.
    #[arg(long = "glob")]
    pub globs: Vec<String>,

    /// Exclusion globs applied to candidate files.
    #[arg(long = "exclude")]
    pub exclude_globs: Vec<String>,

    /// Annotation export with favorites, applied, hidden and notes.
    #[arg(long = "annotations")]
    pub annotations: Option<PathBuf>,

    /// Only consider postings from this thread id.
    #[arg(long = "thread")]
    pub thread: Option<String>,

    /// Kind of thread being filtered (decides match titles). Defaults
    /// to `hiring`.
    #[arg(long = "category", value_enum)]
    pub category: Option<CategoryArg>,

    /// Annotation view applied before the query.
    #[arg(long = "view", value_enum, default_value_t = FilterViewArg::All)]
    pub view: FilterViewArg,

    /// Maximum number of matches to return.
    #[arg(long = "limit")]
    pub limit: Option<usize>,

    /// Attach highlighted HTML to each match (JSON output) or mark
    /// matched terms in text output.
    #[arg(long = "highlight")]
    pub highlight: bool,

    /// Keep only direct replies to the thread, skipping nested
    /// discussion.
    #[arg(long = "top-level-only")]
    pub top_level_only: bool,

    /// Output format (text, table, or json).
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Optional server URL for delegating filtering to a daemon.
    ///
    /// When set (either via this flag or the `HNJOBS_SERVER_URL`
    /// environment variable), the CLI sends the filter configuration
    /// to the HTTP server instead of filtering locally. Use
    /// `--no-server` to override this and force local execution.
    #[arg(long = "server", env = "HNJOBS_SERVER_URL")]
    pub server: Option<String>,

    /// Disable use of any configured server and force local filtering.
    #[arg(long = "no-server")]
    pub no_server: bool,
}

/// Arguments specific to the `categories` subcommand.
#[derive(Args, Debug)]
pub struct CategoriesArgs {
    /// Output format (text, table, or json).
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments specific to the `serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind the HTTP server to.
    #[arg(long = "addr", default_value = DEFAULT_SERVE_ADDR)]
    pub addr: String,
}

pub const DEFAULT_SERVE_ADDR: &str = "127.0.0.1:7878";

/// CLI representation of output format.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Table,
    Json,
}

/// CLI representation of thread categories.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryArg {
    Hiring,
    Hired,
    Freelance,
}

impl CategoryArg {
    pub fn to_model(self) -> Category {
        match self {
            CategoryArg::Hiring => Category::Hiring,
            CategoryArg::Hired => Category::Hired,
            CategoryArg::Freelance => Category::Freelance,
        }
    }
}

/// CLI representation of annotation views.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterViewArg {
    All,
    Favorites,
    Applied,
    HideApplied,
    Notes,
    Hidden,
}

impl FilterViewArg {
    pub fn to_model(self) -> FilterView {
        match self {
            FilterViewArg::All => FilterView::All,
            FilterViewArg::Favorites => FilterView::Favorites,
            FilterViewArg::Applied => FilterView::Applied,
            FilterViewArg::HideApplied => FilterView::HideApplied,
            FilterViewArg::Notes => FilterView::Notes,
            FilterViewArg::Hidden => FilterView::Hidden,
        }
    }
}

/// Resolve the query to parse from CLI `ParseArgs`.
pub fn parse_query_from_args(args: &ParseArgs) -> Result<String> {
    match (&args.query, args.category) {
        (Some(query), _) => Ok(query.clone()),
        (None, Some(category)) => Ok(category.to_model().example_query().to_string()),
        (None, None) => bail!("a query or --category is required"),
    }
}

/// Build a core `FilterConfig` from CLI `FilterArgs`.
pub fn filter_config_from_args(args: &FilterArgs) -> Result<FilterConfig> {
    if args.limit == Some(0) {
        bail!("--limit must be greater than zero");
    }

    let paths = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths.clone()
    };

    Ok(FilterConfig {
        query: args.query.clone().unwrap_or_default(),
        paths,
        globs: args.globs.clone(),
        exclude_globs: args.exclude_globs.clone(),
        annotations: args.annotations.clone(),
        thread: args.thread.clone(),
        category: args
            .category
            .map(CategoryArg::to_model)
            .unwrap_or_default(),
        view: args.view.to_model(),
        limit: args.limit,
        highlight: args.highlight,
        top_level_only: args.top_level_only,
    })
}
