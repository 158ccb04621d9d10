//! Core infrastructure for pyfront.
//!
//! This crate provides language-agnostic infrastructure shared by the
//! parser and the CLI:
//! - [`Span`]: half-open byte ranges into source text
//! - Text utilities for byte offset and line:column conversions

pub mod span;
pub mod text;

pub use span::Span;
pub use text::LineIndex;
