//! Query engine and filter entry points.
//!
//! `query` hosts the tokenizer and evaluator, `highlight` reports where
//! terms occur, `text` turns comment HTML into plain text, and `engine`
//! runs filter passes for the CLI and the HTTP daemon.

pub mod engine;
pub mod highlight;
pub mod query;
pub mod text;

pub use query::{evaluate, parse, parse_display, MatchContext};
