use std::cmp;

use anyhow::Result;

use crate::models::{
    Category, DisplayKind, DisplayToken, FilterResult, JobMatch, ParseResult, Query,
};
use crate::search::highlight::match_ranges;
use crate::search::text::{decode_entities, strip_tags};

/// Marker placed around matched terms in `--highlight` text output.
const TEXT_MATCH_MARK: &str = "**";

/// Printed in place of matches when a filter pass selects nothing.
const NO_MATCHES_MESSAGE: &str = "No matches found!";

/// Render a `FilterResult` in human-readable text form.
///
/// Each match is rendered as a header line:
/// `thread/id title by author created_at [flags]`
/// followed by the indented plain-text body and note. The summary
/// message (`Search results: N`) closes the output when a query was
/// given.
pub fn print_filter_text(result: &FilterResult, highlight: bool) -> Result<()> {
    if result.matches.is_empty() {
        println!("{NO_MATCHES_MESSAGE}");
    }

    for m in &result.matches {
        println!("{}", match_header(m));

        for line in body_lines(&m.job.text, highlight.then_some(&result.tokens)) {
            println!("    {line}");
        }

        if let Some(note) = &m.note {
            println!("    note: {note}");
        }
    }

    if let Some(message) = &result.summary.message {
        println!("{message}");
    }

    Ok(())
}

/// Render a `FilterResult` as a simple table.
///
/// Columns:
/// - THREAD
/// - ID
/// - AUTHOR
/// - FLAGS
/// - TITLE
pub fn print_filter_table(result: &FilterResult) -> Result<()> {
    if result.matches.is_empty() {
        println!("{NO_MATCHES_MESSAGE}");
        if let Some(message) = &result.summary.message {
            println!("{message}");
        }
        return Ok(());
    }

    const MAX_AUTHOR_WIDTH: usize = 20;
    const MAX_TITLE_WIDTH: usize = 60;

    let rows: Vec<[String; 5]> = result
        .matches
        .iter()
        .map(|m| {
            [
                m.job.thread_id.clone(),
                m.job.id.clone(),
                m.job.author.clone(),
                flags(m).join(","),
                m.title.clone(),
            ]
        })
        .collect();

    let headers = ["THREAD", "ID", "AUTHOR", "FLAGS", "TITLE"];
    let max_widths = [usize::MAX, usize::MAX, MAX_AUTHOR_WIDTH, usize::MAX, MAX_TITLE_WIDTH];

    let mut widths = [0usize; 5];
    for (col, width) in widths.iter_mut().enumerate() {
        let longest = rows
            .iter()
            .map(|r| r[col].chars().count())
            .max()
            .unwrap_or(0);
        *width = cmp::min(cmp::max(headers[col].len(), longest), max_widths[col]);
    }

    print_row(&headers.map(str::to_string), &widths);
    for row in &rows {
        print_row(row, &widths);
    }

    if let Some(message) = &result.summary.message {
        println!("{message}");
    }

    Ok(())
}

fn print_row(cells: &[String; 5], widths: &[usize; 5]) {
    let [thread_w, id_w, author_w, flags_w, title_w] = *widths;
    println!(
        "{:<thread_w$} {:<id_w$} {:<author_w$} {:<flags_w$} {:<title_w$}",
        truncate(&cells[0], thread_w),
        truncate(&cells[1], id_w),
        truncate(&cells[2], author_w),
        truncate(&cells[3], flags_w),
        truncate(&cells[4], title_w),
    );
}

/// Render a `ParseResult` as one chip per line.
pub fn print_parse_text(result: &ParseResult) -> Result<()> {
    for chip in &result.display {
        println!("{}", render_chip(chip));
    }
    Ok(())
}

/// Render a `ParseResult` as a KIND/NEGATED/TEXT table.
pub fn print_parse_table(result: &ParseResult) -> Result<()> {
    if result.display.is_empty() {
        return Ok(());
    }

    let text_width = result
        .display
        .iter()
        .map(|c| c.text.chars().count())
        .max()
        .unwrap_or(0)
        .max("TEXT".len());

    println!("{:<8} {:<7} {:<text_width$}", "KIND", "NEGATED", "TEXT");
    for chip in &result.display {
        let kind = match chip.kind {
            DisplayKind::Operator => "operator",
            DisplayKind::Word => "word",
            DisplayKind::Phrase => "phrase",
        };
        let negated = if chip.negated { "yes" } else { "no" };
        println!("{:<8} {:<7} {:<text_width$}", kind, negated, chip.text);
    }

    Ok(())
}

/// Render the category list in human-readable text form.
pub fn print_categories_text() -> Result<()> {
    for category in Category::ALL {
        println!("{}: {}", category.key(), category.label());
        println!("    threads : {}", category.thread_query());
        println!("    example : {}", category.example_query());
    }
    Ok(())
}

/// Render the category list as a table.
pub fn print_categories_table() -> Result<()> {
    let label_width = Category::ALL
        .iter()
        .map(|c| c.label().len())
        .max()
        .unwrap_or(0)
        .max("LABEL".len());

    println!("{:<9} {:<label_width$} {}", "CATEGORY", "LABEL", "EXAMPLE");
    for category in Category::ALL {
        println!(
            "{:<9} {:<label_width$} {}",
            category.key(),
            category.label(),
            category.example_query()
        );
    }
    Ok(())
}

fn render_chip(chip: &DisplayToken) -> String {
    let negation = if chip.negated { "~" } else { "" };
    match chip.kind {
        DisplayKind::Operator => match chip.text.as_str() {
            "|" => "OR".to_string(),
            "&" => "AND".to_string(),
            other => other.to_string(),
        },
        DisplayKind::Word => format!("{negation}word {}", chip.text),
        DisplayKind::Phrase if chip.text == "\"\"" => format!("{negation}phrase \"\""),
        DisplayKind::Phrase => format!("{negation}phrase \"{}\"", chip.text),
    }
}

fn match_header(m: &JobMatch) -> String {
    let mut header = format!(
        "{}/{} {} by {}",
        m.job.thread_id, m.job.id, m.title, m.job.author
    );
    if let Some(created) = &m.job.created_at {
        header.push(' ');
        header.push_str(created);
    }

    let flags = flags(m);
    if !flags.is_empty() {
        header.push_str(&format!(" [{}]", flags.join(", ")));
    }
    header
}

fn flags(m: &JobMatch) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if m.favorite {
        flags.push("favorite");
    }
    if m.applied {
        flags.push("applied");
    }
    if m.hidden {
        flags.push("hidden");
    }
    if m.note.is_some() {
        flags.push("note");
    }
    flags
}

/// Non-blank plain-text lines of a posting body.
///
/// Terms are marked before entities are decoded, so marks land exactly
/// where evaluation saw a match in the raw comment text.
fn body_lines(html: &str, highlight: Option<&Query>) -> Vec<String> {
    let text = strip_tags(html);
    let text = match highlight {
        Some(query) => mark_matches(&text, query),
        None => text,
    };

    decode_entities(&text)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn mark_matches(text: &str, query: &Query) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for range in match_ranges(text, query) {
        out.push_str(&text[last..range.start]);
        out.push_str(TEXT_MATCH_MARK);
        out.push_str(&text[range.clone()]);
        out.push_str(TEXT_MATCH_MARK);
        last = range.end;
    }
    out.push_str(&text[last..]);
    out
}

fn truncate(s: &str, max_width: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_width {
        s.to_string()
    } else if max_width <= 1 {
        "…".to_string()
    } else {
        s.chars()
            .take(max_width.saturating_sub(1))
            .collect::<String>()
            + "…"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::engine::run_parse;

    #[test]
    fn truncate_leaves_short_strings_unchanged() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abc", 3), "abc");
    }

    #[test]
    fn truncate_handles_unicode_characters() {
        assert_eq!(truncate("éééé", 3), "éé…");
        assert_eq!(truncate("abcdef", 1), "…");
    }

    #[test]
    fn body_lines_mark_terms_and_decode_entities() {
        let html = "Acme | Rust<p>We&#x27;re hiring &amp; growing";
        let query = crate::search::parse("rust hiring");
        assert_eq!(
            body_lines(html, Some(&query)),
            vec!["Acme | **Rust**", "We're **hiring** & growing"]
        );
        assert_eq!(
            body_lines(html, None),
            vec!["Acme | Rust", "We're hiring & growing"]
        );
    }

    #[test]
    fn marks_only_what_evaluation_would_match() {
        let html = "We&#x27;re hiring";
        let query = crate::search::parse("\"we're\"");
        assert!(!crate::search::evaluate(html, "", "", &query));
        assert_eq!(body_lines(html, Some(&query)), vec!["We're hiring"]);
    }

    #[test]
    fn chips_render_operators_and_placeholders() {
        let result = run_parse("python | ~java & \"\" ~\"on site\"");
        let rendered: Vec<String> = result.display.iter().map(render_chip).collect();
        assert_eq!(
            rendered,
            vec![
                "word python",
                "OR",
                "~word java",
                "AND",
                "phrase \"\"",
                "~phrase \"on site\"",
            ]
        );
    }
}
