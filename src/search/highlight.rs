//! Match highlighting for query terms.
//!
//! Highlighting uses the same matching rules as evaluation (whole
//! words for bare terms, substrings for phrases) but reports where the
//! terms occur instead of a yes/no decision. Negated terms are never
//! highlighted.

use std::ops::Range;

use crate::models::{Query, Term};
use crate::search::query::term_ranges;

/// Opening tag wrapped around every highlighted range.
pub const MATCH_OPEN: &str = "<span class=\"search-match\">";
pub const MATCH_CLOSE: &str = "</span>";

/// Elements whose content is never highlighted.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Byte ranges in `text` covered by non-negated query terms.
///
/// Matching is case-insensitive; ranges index into the original
/// `text`, are sorted, and overlapping or touching ranges are merged.
pub fn match_ranges(text: &str, query: &Query) -> Vec<Range<usize>> {
    let terms = highlight_terms(query);
    ranges_for_terms(text, &terms)
}

/// Wrap every term occurrence in `html` with a `search-match` span.
///
/// Only text between tags is touched: tag names, attributes (such as
/// link targets) and the content of `<script>`/`<style>` elements are
/// copied through unchanged.
pub fn highlight_html(html: &str, query: &Query) -> String {
    let terms = highlight_terms(query);
    if terms.is_empty() {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len() + 32);
    let mut rest = html;
    let mut raw_element: Option<&'static str> = None;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            push_text(&mut out, rest, &terms, raw_element.is_some());
            break;
        };

        push_text(&mut out, &rest[..lt], &terms, raw_element.is_some());

        let tag_end = rest[lt..].find('>').map_or(rest.len(), |idx| lt + idx + 1);
        let tag = &rest[lt..tag_end];
        out.push_str(tag);

        if let Some((name, closing)) = tag_name(tag) {
            match raw_element {
                Some(open) if closing && name == open => raw_element = None,
                None if !closing => {
                    raw_element = RAW_TEXT_ELEMENTS.iter().copied().find(|el| *el == name);
                }
                _ => {}
            }
        }

        rest = &rest[tag_end..];
    }

    out
}

fn highlight_terms(query: &Query) -> Vec<&Term> {
    query.terms().filter(|term| !term.negated).collect()
}

fn push_text(out: &mut String, text: &str, terms: &[&Term], raw: bool) {
    if raw || text.trim().is_empty() {
        out.push_str(text);
        return;
    }

    let mut last = 0;
    for range in ranges_for_terms(text, terms) {
        out.push_str(&text[last..range.start]);
        out.push_str(MATCH_OPEN);
        out.push_str(&text[range.clone()]);
        out.push_str(MATCH_CLOSE);
        last = range.end;
    }
    out.push_str(&text[last..]);
}

fn ranges_for_terms(text: &str, terms: &[&Term]) -> Vec<Range<usize>> {
    if terms.is_empty() || text.is_empty() {
        return Vec::new();
    }

    let lowered = LoweredText::new(text);
    let mut ranges: Vec<Range<usize>> = terms
        .iter()
        .flat_map(|term| term_ranges(&lowered.text, term))
        .map(|range| lowered.original(range))
        .filter(|range| !range.is_empty())
        .collect();

    ranges.sort_by_key(|range| (range.start, range.end));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

/// Lowercased copy of a text that remembers, for every byte, where it
/// came from in the original. Lowercasing can change byte lengths
/// (`İ` becomes `i̇`), so ranges cannot be reused directly.
struct LoweredText {
    /// Same string `MatchContext::new` evaluates against.
    text: String,
    /// `origin[i]` is the original byte offset of lowered byte `i`;
    /// one extra trailing entry maps the end of the text.
    origin: Vec<usize>,
}

impl LoweredText {
    fn new(text: &str) -> Self {
        // `str::to_lowercase` differs from per-char lowercasing only for
        // a word-final `Σ` (`ς` vs `σ`), and both are two bytes, so
        // per-char lengths line up with the whole-string result.
        let lowered = text.to_lowercase();
        let mut origin = Vec::with_capacity(lowered.len() + 1);

        for (idx, ch) in text.char_indices() {
            let len: usize = ch.to_lowercase().map(char::len_utf8).sum();
            origin.extend(std::iter::repeat(idx).take(len));
        }
        origin.push(text.len());

        Self {
            text: lowered,
            origin,
        }
    }

    fn original(&self, range: Range<usize>) -> Range<usize> {
        self.origin[range.start]..self.origin[range.end]
    }
}

/// Lowercase element name of a tag and whether it is a closing tag.
fn tag_name(tag: &str) -> Option<(String, bool)> {
    let inner = tag.strip_prefix('<')?;
    let (inner, closing) = match inner.strip_prefix('/') {
        Some(rest) => (rest, true),
        None => (inner, false),
    };

    let name: String = inner
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric())
        .collect();
    if name.is_empty() {
        return None;
    }

    Some((name.to_ascii_lowercase(), closing))
}
