//! Search and filtering for Hacker News "Who is hiring?" threads.
//!
//! The core is a small boolean query language (`search::query`):
//! `python | javascript & remote & ~us-based` is tokenized by `parse`
//! and checked against a posting's body, author and note by
//! `evaluate`. The remaining modules load saved thread dumps and
//! annotation exports and expose filtering through a CLI and an HTTP
//! daemon.

pub mod annotations;
pub mod cli;
pub mod models;
pub mod search;
pub mod server;
pub mod threads;

pub use models::{Operator, Query, Term, Token};
pub use search::{evaluate, parse};
