//! pyfront: a Python source front end.
//!
//! The tokenizer, parser, syntax tree and visitor live in `pyfront-parser`;
//! spans and line/column utilities in `pyfront-core`. This crate adds the
//! command-line layer on top: configuration files, JSON responses and the
//! `tokens`, `parse` and `check` commands.

pub use pyfront_core::{span, text};
pub use pyfront_parser as parser;

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
