use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::cli::args::{CategoryArg, FilterViewArg, OutputFormat, DEFAULT_SERVE_ADDR};
use crate::cli::{FilterArgs, ParseArgs, ServeArgs};

/// Top-level representation of `.hnjobs/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub filter: Option<FilterSection>,

    #[serde(default)]
    pub parse: Option<ParseSection>,

    #[serde(default)]
    pub serve: Option<ServeSection>,

    #[serde(default)]
    pub http: Option<HttpSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterSection {
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    #[serde(default)]
    pub globs: Vec<String>,
    #[serde(default, alias = "exclude")]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub annotations: Option<PathBuf>,
    #[serde(default)]
    pub category: Option<CategoryArg>,
    #[serde(default)]
    pub view: Option<FilterViewArg>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub highlight: Option<bool>,
    #[serde(default)]
    pub top_level_only: Option<bool>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub no_server: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ParseSection {
    #[serde(default)]
    pub category: Option<CategoryArg>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub no_server: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServeSection {
    #[serde(default)]
    pub addr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HttpSection {
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Discover and load a project-local `.hnjobs/config.toml` (or
/// `.hnjobs/hnjobs.toml`) starting from the current working directory
/// and walking up parent directories.
pub fn load_cli_config() -> Result<Option<CliConfig>> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let config_path = find_project_config(&cwd);

    let Some(path) = config_path else {
        return Ok(None);
    };

    debug!("loading config from {}", path.display());
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: CliConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse TOML config at {}", path.display()))?;

    Ok(Some(config))
}

fn find_project_config(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);

    while let Some(current) = dir {
        let hnjobs_dir = current.join(".hnjobs");
        let config_toml = hnjobs_dir.join("config.toml");
        if config_toml.is_file() {
            return Some(config_toml);
        }

        let hnjobs_toml = hnjobs_dir.join("hnjobs.toml");
        if hnjobs_toml.is_file() {
            return Some(hnjobs_toml);
        }

        dir = current.parent();
    }

    None
}

/// Server URL to fall back on when the flag and env var are unset:
/// the section's own `server`, else the global `[http] server_url`.
fn fallback_server(config: &CliConfig, section_server: Option<&String>) -> Option<String> {
    section_server
        .or_else(|| config.http.as_ref().and_then(|http| http.server_url.as_ref()))
        .cloned()
}

pub fn apply_filter_config_defaults(config: &CliConfig, args: &mut FilterArgs) {
    let Some(filter) = &config.filter else {
        if args.server.is_none() {
            args.server = fallback_server(config, None);
        }
        return;
    };

    if args.paths.is_empty() && !filter.paths.is_empty() {
        args.paths = filter.paths.clone();
    }

    if args.globs.is_empty() && !filter.globs.is_empty() {
        args.globs = filter.globs.clone();
    }

    if args.exclude_globs.is_empty() && !filter.exclude_globs.is_empty() {
        args.exclude_globs = filter.exclude_globs.clone();
    }

    if args.annotations.is_none() {
        if let Some(annotations) = &filter.annotations {
            args.annotations = Some(annotations.clone());
        }
    }

    if args.category.is_none() {
        args.category = filter.category;
    }

    if matches!(args.view, FilterViewArg::All) {
        if let Some(view) = filter.view {
            args.view = view;
        }
    }

    if args.limit.is_none() {
        if let Some(limit) = filter.limit {
            args.limit = Some(limit);
        }
    }

    if !args.highlight {
        if let Some(true) = filter.highlight {
            args.highlight = true;
        }
    }

    if !args.top_level_only {
        if let Some(true) = filter.top_level_only {
            args.top_level_only = true;
        }
    }

    if matches!(args.format, OutputFormat::Text) {
        if let Some(format) = filter.format {
            args.format = format;
        }
    }

    if args.server.is_none() {
        args.server = fallback_server(config, filter.server.as_ref());
    }

    if !args.no_server {
        if let Some(true) = filter.no_server {
            args.no_server = true;
        }
    }
}

pub fn apply_parse_config_defaults(config: &CliConfig, args: &mut ParseArgs) {
    let Some(parse) = &config.parse else {
        if args.server.is_none() {
            args.server = fallback_server(config, None);
        }
        return;
    };

    if args.category.is_none() {
        args.category = parse.category;
    }

    if matches!(args.format, OutputFormat::Text) {
        if let Some(format) = parse.format {
            args.format = format;
        }
    }

    if args.server.is_none() {
        args.server = fallback_server(config, parse.server.as_ref());
    }

    if !args.no_server {
        if let Some(true) = parse.no_server {
            args.no_server = true;
        }
    }
}

pub fn apply_serve_config_defaults(config: &CliConfig, args: &mut ServeArgs) {
    if let Some(serve) = &config.serve {
        if args.addr == DEFAULT_SERVE_ADDR {
            if let Some(addr) = &serve.addr {
                args.addr = addr.clone();
            }
        }
    }
}
