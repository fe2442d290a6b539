//! Query language parsing and evaluation.
//!
//! The language is a flat boolean expression over search terms:
//! - Whitespace separates tokens; `"..."` groups a phrase into one
//!   token. An unterminated quote runs to the end of the input.
//! - An isolated `|` is OR and an isolated `&` is AND.
//! - A leading `~` negates a term.
//! - Bare words match whole words; phrases match as substrings.
//! - Terms are folded strictly left to right, with no precedence and
//!   no grouping. Adjacent terms with no operator between them are
//!   combined with `IMPLICIT_OPERATOR` (AND).
//!
//! Parsing never fails. Malformed input (stray operators, empty
//! phrases, repeated `~`) is normalized away.

use std::borrow::Cow;
use std::ops::Range;

use crate::models::{DisplayKind, DisplayToken, Operator, Query, Term, Token};

/// Combinator assumed between two terms typed without an operator, so
/// that `python remote` requires both words.
pub const IMPLICIT_OPERATOR: Operator = Operator::And;

/// Parse a raw query string into an evaluable `Query`.
///
/// Term text is lowercased here; evaluation never lowercases terms
/// again. Terms with no match text (`""`, a bare `~`) are dropped.
pub fn parse(input: &str) -> Query {
    let tokens = scan(input).iter().filter_map(RawToken::to_token).collect();
    Query::new(tokens)
}

/// Break a raw query into display chips, one per raw token.
///
/// This keeps the tokens `parse` drops so the caller can show exactly
/// what was typed: empty phrases become the placeholder `""` and a
/// bare `~` becomes an empty negated word.
pub fn parse_display(input: &str) -> Vec<DisplayToken> {
    scan(input).iter().map(RawToken::to_display).collect()
}

/// Evaluate `query` against the three text fields of a posting.
///
/// Fields may be in any case; they are lowercased once here. Callers
/// that already hold lowercase text should build a
/// `MatchContext::from_lowercase` and call `MatchContext::matches`.
pub fn evaluate(body: &str, author: &str, note: &str, query: &Query) -> bool {
    MatchContext::new(body, author, note).matches(query)
}

/// Lowercased text fields a query is evaluated against.
#[derive(Debug, Clone)]
pub struct MatchContext<'a> {
    body: Cow<'a, str>,
    author: Cow<'a, str>,
    note: Cow<'a, str>,
}

impl MatchContext<'static> {
    pub fn new(body: &str, author: &str, note: &str) -> Self {
        Self {
            body: Cow::Owned(body.to_lowercase()),
            author: Cow::Owned(author.to_lowercase()),
            note: Cow::Owned(note.to_lowercase()),
        }
    }
}

impl<'a> MatchContext<'a> {
    /// Borrow fields that are already lowercase.
    pub fn from_lowercase(body: &'a str, author: &'a str, note: &'a str) -> Self {
        Self {
            body: Cow::Borrowed(body),
            author: Cow::Borrowed(author),
            note: Cow::Borrowed(note),
        }
    }

    pub fn fields(&self) -> [&str; 3] {
        [&*self.body, &*self.author, &*self.note]
    }

    /// Truth value of a single term, negation applied.
    pub fn term_matches(&self, term: &Term) -> bool {
        let found = self
            .fields()
            .iter()
            .any(|field| term_ranges(field, term).next().is_some());
        found != term.negated
    }

    /// Fold the query left to right.
    ///
    /// - A query without terms matches everything.
    /// - Operators only take effect between two terms; leading,
    ///   trailing and operator-only input is ignored.
    /// - When several operators sit between two terms the last one
    ///   wins.
    pub fn matches(&self, query: &Query) -> bool {
        let mut result: Option<bool> = None;
        let mut pending: Option<Operator> = None;

        for token in query {
            match token {
                Token::Operator(op) => pending = Some(*op),
                Token::Term(term) => {
                    let value = match result {
                        None => self.term_matches(term),
                        Some(acc) => match (pending.unwrap_or(IMPLICIT_OPERATOR), acc) {
                            (Operator::And, false) => false,
                            (Operator::Or, true) => true,
                            (op, acc) => op.apply(acc, self.term_matches(term)),
                        },
                    };
                    result = Some(value);
                    pending = None;
                }
            }
        }

        result.unwrap_or(true)
    }
}

/// Byte ranges of every occurrence of `term` in a lowercase haystack,
/// ignoring negation.
pub(crate) fn term_ranges<'h>(
    haystack: &'h str,
    term: &'h Term,
) -> Box<dyn Iterator<Item = Range<usize>> + 'h> {
    if term.exact {
        Box::new(
            haystack
                .match_indices(term.text.as_str())
                .map(|(start, m)| start..start + m.len()),
        )
    } else {
        Box::new(whole_word_ranges(haystack, &term.text))
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Occurrences of `needle` bounded on both sides by a non-word
/// character or the edge of the haystack.
fn whole_word_ranges<'h>(
    haystack: &'h str,
    needle: &'h str,
) -> impl Iterator<Item = Range<usize>> + 'h {
    let mut search_start = 0;

    std::iter::from_fn(move || {
        if needle.is_empty() {
            return None;
        }

        while search_start <= haystack.len() {
            let start = search_start + haystack[search_start..].find(needle)?;
            let end = start + needle.len();

            let left_ok = haystack[..start]
                .chars()
                .next_back()
                .map_or(true, |ch| !is_word_char(ch));
            let right_ok = haystack[end..]
                .chars()
                .next()
                .map_or(true, |ch| !is_word_char(ch));

            if left_ok && right_ok {
                search_start = end;
                return Some(start..end);
            }

            // Step one character so overlapping candidates are still seen.
            let step = haystack[start..].chars().next().map_or(1, char::len_utf8);
            search_start = start + step;
        }

        None
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawBody<'a> {
    Word(&'a str),
    /// Content between the quotes; the closing quote may be missing.
    Phrase(&'a str),
}

/// One whitespace-delimited unit of the input, before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawToken<'a> {
    negated: bool,
    body: RawBody<'a>,
}

impl RawToken<'_> {
    fn operator(&self) -> Option<Operator> {
        match (self.negated, self.body) {
            (false, RawBody::Word("|")) => Some(Operator::Or),
            (false, RawBody::Word("&")) => Some(Operator::And),
            _ => None,
        }
    }

    fn to_token(&self) -> Option<Token> {
        if let Some(op) = self.operator() {
            return Some(Token::Operator(op));
        }

        let (text, exact) = match self.body {
            RawBody::Word(text) => (text, false),
            RawBody::Phrase(text) => (text, true),
        };
        if text.trim().is_empty() {
            return None;
        }

        Some(Token::Term(Term {
            text: text.to_lowercase(),
            exact,
            negated: self.negated,
        }))
    }

    fn to_display(&self) -> DisplayToken {
        if let Some(op) = self.operator() {
            return DisplayToken {
                kind: DisplayKind::Operator,
                text: op.symbol().to_string(),
                negated: false,
            };
        }

        match self.body {
            RawBody::Word(text) => DisplayToken {
                kind: DisplayKind::Word,
                text: text.to_string(),
                negated: self.negated,
            },
            RawBody::Phrase(text) => DisplayToken {
                kind: DisplayKind::Phrase,
                text: if text.is_empty() {
                    "\"\"".to_string()
                } else {
                    text.to_string()
                },
                negated: self.negated,
            },
        }
    }
}

/// Split the input into raw tokens.
///
/// A `"` opens a phrase only at the start of a token (after any `~`
/// markers) and the closing quote ends the token. Elsewhere a quote is
/// an ordinary character.
fn scan(input: &str) -> Vec<RawToken<'_>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(_, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let mut negated = false;
        while let Some(&(_, '~')) = chars.peek() {
            negated = true;
            chars.next();
        }

        let body = match chars.peek().copied() {
            Some((quote, '"')) => {
                chars.next();
                let mut end = input.len();
                for (idx, c) in chars.by_ref() {
                    if c == '"' {
                        end = idx;
                        break;
                    }
                }
                RawBody::Phrase(&input[quote + 1..end])
            }
            Some((start, _)) => {
                let mut end = input.len();
                while let Some(&(idx, c)) = chars.peek() {
                    if c.is_whitespace() {
                        end = idx;
                        break;
                    }
                    chars.next();
                }
                RawBody::Word(&input[start..end])
            }
            None => RawBody::Word(""),
        };

        tokens.push(RawToken { negated, body });
    }

    tokens
}
