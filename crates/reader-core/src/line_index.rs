//! Logical line index over a read-only document.
//!
//! Built once from the host's line sequence and queried with the 1-based `(row, column)`
//! positions used by annotation tuples. Offsets are in Unicode scalar values (`char`) from the
//! start of the document, with a single `\n` between lines.

use ropey::Rope;
use serde::{Deserialize, Serialize};

/// How annotation columns count positions within a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnEncoding {
    /// Columns count characters (Unicode scalar values).
    #[default]
    Chars,
    /// Columns count UTF-8 bytes, as emitted by byte-oriented indexers.
    ///
    /// A byte column that falls inside a multi-byte character does not resolve.
    Utf8Bytes,
}

/// Logical line index - implemented using Rope data structure
///
/// Lookups are O(log N), so decoding tens of thousands of tuples stays cheap even for large files.
#[derive(Debug, Clone)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Create an index over an empty document (one empty line).
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build line index from text
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Build line index from a line sequence (no line endings), joining lines with `\n`.
    ///
    /// An empty sequence yields a document with a single empty line.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for (i, line) in lines.into_iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(line.as_ref());
        }
        Self::from_text(&text)
    }

    /// Get total line count
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get total character count (the document length in offsets).
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Offset of the first character of the 1-based `row`.
    pub fn line_start(&self, row: usize) -> Option<usize> {
        if row == 0 || row > self.line_count() {
            return None;
        }
        Some(self.rope.line_to_char(row - 1))
    }

    /// Character length of the 1-based `row`, excluding its line ending.
    pub fn line_len(&self, row: usize) -> Option<usize> {
        let start = self.line_start(row)?;
        let end = if row < self.line_count() {
            // -1 for the `\n`
            self.rope.line_to_char(row) - 1
        } else {
            self.rope.len_chars()
        };
        let mut len = end - start;
        // Tolerate `\r\n` documents built through `from_text`.
        if len > 0 && self.rope.char(start + len - 1) == '\r' && row < self.line_count() {
            len -= 1;
        }
        Some(len)
    }

    /// Text of the 1-based `row` (excluding its line ending).
    pub fn line_text(&self, row: usize) -> Option<String> {
        let start = self.line_start(row)?;
        let len = self.line_len(row)?;
        Some(self.rope.slice(start..start + len).to_string())
    }

    /// Resolve a 1-based `(row, column)` pair into a document offset.
    ///
    /// `column` may point one past the last character of the line (an end-exclusive position).
    /// Returns `None` when the row or column lies outside the document.
    pub fn offset_at(&self, row: usize, column: usize, encoding: ColumnEncoding) -> Option<usize> {
        if column == 0 {
            return None;
        }
        let start = self.line_start(row)?;
        let len = self.line_len(row)?;

        let char_column = match encoding {
            ColumnEncoding::Chars => column - 1,
            ColumnEncoding::Utf8Bytes => {
                let text = self.rope.slice(start..start + len);
                let byte = column - 1;
                if byte > text.len_bytes() {
                    return None;
                }
                let chars = text.byte_to_char(byte);
                // Reject columns in the middle of a multi-byte character.
                if text.char_to_byte(chars) != byte {
                    return None;
                }
                chars
            }
        };

        if char_column > len {
            return None;
        }
        Some(start + char_column)
    }

    /// Convert a document offset into a 1-based `(row, column)` pair (character columns).
    pub fn position_of(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.rope.len_chars());
        let line_idx = self.rope.char_to_line(offset);
        let line_start = self.rope.line_to_char(line_idx);
        (line_idx + 1, offset - line_start + 1)
    }

    /// Get complete text
    pub fn text(&self) -> String {
        self.rope.to_string()
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}
