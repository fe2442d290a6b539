//! Loading job postings from saved thread dumps.
//!
//! A dump is a JSON file holding the comments of one thread, either as
//! a bare array or as a search API response with a `hits` array. Both
//! the item API field names (`id`, `text`) and the search API names
//! (`objectID`, `comment_text`) are accepted.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::{FilterConfig, JobPosting};

/// Load every posting reachable from the configured paths.
///
/// Directories are walked recursively (honoring ignore files); when no
/// inclusion globs are configured only `*.json` files are read. Files
/// are visited in path order so results are stable across runs.
///
/// A dump named explicitly on the command line must parse; malformed
/// JSON found while walking a directory is skipped with a warning.
pub fn load_postings(config: &FilterConfig) -> Result<Vec<JobPosting>> {
    let include_globs = build_globset(&config.globs)?;
    let exclude_globs = build_globset(&config.exclude_globs)?;

    let mut files = Vec::new();
    for root in &config.paths {
        for entry_result in WalkBuilder::new(root).build() {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    warn!("skipping unreadable entry under {}: {err}", root.display());
                    continue;
                }
            };

            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }

            let path = entry.path();
            let included = match &include_globs {
                Some(set) => set.is_match(path),
                None => has_json_extension(path),
            };
            if !included {
                continue;
            }
            if let Some(set) = &exclude_globs {
                if set.is_match(path) {
                    continue;
                }
            }

            files.push((path.to_path_buf(), entry.depth() == 0));
        }
    }

    // Explicit entries sort ahead of walked duplicates so dedup keeps them.
    files.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
    files.dedup_by(|a, b| a.0 == b.0);

    let mut postings = Vec::new();
    for (path, explicit) in files {
        match load_dump(&path, config.top_level_only) {
            Ok(mut loaded) => {
                debug!("loaded {} postings from {}", loaded.len(), path.display());
                postings.append(&mut loaded);
            }
            Err(err) if !explicit => {
                warn!("skipping {}: {err:#}", path.display());
            }
            Err(err) => return Err(err),
        }
    }

    Ok(postings)
}

/// Parse a single thread dump file.
pub fn load_dump(path: &Path, top_level_only: bool) -> Result<Vec<JobPosting>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read thread dump at {}", path.display()))?;
    let dump: ThreadDump = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse thread dump at {}", path.display()))?;

    let fallback_thread = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let comments = match dump {
        ThreadDump::Search { hits } => hits,
        ThreadDump::Comments(comments) => comments,
    };

    Ok(comments
        .into_iter()
        .filter_map(|raw| raw.into_posting(&fallback_thread, top_level_only))
        .collect())
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?);
    }
    Ok(Some(builder.build()?))
}

fn format_timestamp_rfc3339(secs: i64) -> Option<String> {
    use time::{format_description::well_known::Rfc3339, OffsetDateTime};

    let dt = OffsetDateTime::from_unix_timestamp(secs).ok()?;
    dt.format(&Rfc3339).ok()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ThreadDump {
    Search { hits: Vec<RawComment> },
    Comments(Vec<RawComment>),
}

/// Identifiers arrive as numbers from one API and strings from the
/// other.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawComment {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default, rename = "objectID")]
    object_id: Option<RawId>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    comment_text: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    created_at_i: Option<i64>,
    #[serde(default)]
    parent_id: Option<RawId>,
    #[serde(default)]
    story_id: Option<RawId>,
    #[serde(default)]
    story_title: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl RawComment {
    /// Convert to a posting, dropping deleted comments, non-comment
    /// items and (optionally) replies nested below the top level.
    fn into_posting(self, fallback_thread: &str, top_level_only: bool) -> Option<JobPosting> {
        if matches!(self.kind.as_deref(), Some(kind) if kind != "comment") {
            return None;
        }

        let id = self.id.or(self.object_id)?.into_string();
        let text = self.text.or(self.comment_text).filter(|t| !t.trim().is_empty())?;

        let story_id = self.story_id.map(RawId::into_string);
        let parent_id = self.parent_id.map(RawId::into_string);
        if top_level_only {
            if let (Some(story), Some(parent)) = (&story_id, &parent_id) {
                if story != parent {
                    return None;
                }
            }
        }

        let created_at = self
            .created_at
            .or_else(|| self.created_at_i.and_then(format_timestamp_rfc3339));

        Some(JobPosting {
            id,
            thread_id: story_id.unwrap_or_else(|| fallback_thread.to_string()),
            author: self.author.unwrap_or_default(),
            text,
            created_at,
            story_title: self.story_title,
        })
    }
}
