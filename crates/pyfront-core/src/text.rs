//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines are **1-indexed** (matching editor and Python conventions)
//! - Columns are **0-indexed byte columns** (matching Python's `col_offset`)
//! - Byte offsets are **0-indexed**
//!
//! [`LineIndex`] is built once per source text and answers offset queries in
//! `O(log n)`. The free functions are convenient for one-off conversions.

use crate::span::Span;

// ============================================================================
// Line Index
// ============================================================================

/// Precomputed line start offsets for a source text.
///
/// `\n`, `\r\n` and a lone `\r` all terminate a line, matching the
/// tokenizer's view of physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Build the index for `content`.
    pub fn new(content: &str) -> Self {
        let bytes = content.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    line_starts.push(i + 1);
                }
                _ => {}
            }
            i += 1;
        }
        LineIndex {
            line_starts,
            len: bytes.len(),
        }
    }

    /// Number of physical lines (a trailing newline does not open a new line).
    pub fn line_count(&self) -> usize {
        match self.line_starts.last() {
            Some(&last) if last == self.len && self.line_starts.len() > 1 => {
                self.line_starts.len() - 1
            }
            _ if self.len == 0 => 0,
            _ => self.line_starts.len(),
        }
    }

    /// Convert a byte offset to `(line, col)`: 1-indexed line, 0-indexed byte column.
    ///
    /// Offsets beyond the content are clamped to the end.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        (line_idx + 1, offset - self.line_starts[line_idx])
    }

    /// Byte offset of the first byte of `line` (1-indexed).
    ///
    /// Line 0 is treated as line 1; lines past the end map to the content length.
    pub fn line_start(&self, line: usize) -> usize {
        let idx = line.max(1) - 1;
        self.line_starts.get(idx).copied().unwrap_or(self.len)
    }

    /// Byte offset one past the end of `line`, including its terminator.
    pub fn line_end(&self, line: usize) -> usize {
        self.line_starts.get(line.max(1)).copied().unwrap_or(self.len)
    }

    /// Convert a 1-indexed line and 0-indexed byte column to an offset.
    pub fn offset(&self, line: usize, col: usize) -> usize {
        let start = self.line_start(line);
        (start + col).min(self.line_end(line))
    }
}

// ============================================================================
// Free Functions
// ============================================================================

/// Convert a byte offset to `(line, col)` without building an index.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (usize, usize) {
    LineIndex::new(content).position(offset)
}

/// Extract the text content of a span as a string.
///
/// Returns `None` if the span extends beyond content bounds or splits a
/// UTF-8 sequence.
pub fn extract_span_str<'a>(content: &'a str, span: &Span) -> Option<&'a str> {
    content.get(span.start..span.end)
}

// ============================================================================
// Tests
// ============================================================================
