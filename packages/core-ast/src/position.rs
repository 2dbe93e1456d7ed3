//! Byte offset to line/column mapping.
//!
//! Offsets are UTF-8 byte offsets, the same unit as node spans. Lines and
//! columns are 1-based; columns count characters, not bytes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl LineColumn {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Start offset of every line, for repeated lookups against one text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOffsetTable {
    starts: Vec<usize>,
    len: usize,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, byte)| byte == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            starts,
            len: source.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Offset where a 1-based line starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.starts.get(line.checked_sub(1)?).copied()
    }

    /// Offsets past the end clamp to the end; offsets inside a multi-byte
    /// character floor to its start.
    pub fn offset_to_line_column(&self, source: &str, offset: usize) -> LineColumn {
        let offset = floor_char_boundary(source, offset.min(self.len));
        let line_index = match self.starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        let column = source[self.starts[line_index]..offset].chars().count() + 1;
        LineColumn::new(line_index + 1, column)
    }

    /// Columns past the end of the line clamp to the line end; lines past
    /// the last clamp to the end of the text.
    pub fn line_column_to_offset(&self, source: &str, line: usize, column: usize) -> usize {
        let line = line.max(1);
        let Some(start) = self.line_start(line) else {
            return self.len;
        };
        let end = match self.starts.get(line) {
            Some(next) => next - 1,
            None => self.len,
        };

        let text = &source[start..end];
        let wanted = column.max(1) - 1;
        start
            + text
                .char_indices()
                .nth(wanted)
                .map_or(text.len(), |(i, _)| i)
    }
}

pub fn offset_to_line_column(source: &str, offset: usize) -> LineColumn {
    LineOffsetTable::build(source).offset_to_line_column(source, offset)
}

pub fn line_column_to_offset(source: &str, line: usize, column: usize) -> usize {
    LineOffsetTable::build(source).line_column_to_offset(source, line, column)
}

fn floor_char_boundary(source: &str, mut offset: usize) -> usize {
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_line_column() {
        let source = "abc\ndefgh\nij";

        assert_eq!(offset_to_line_column(source, 0), LineColumn::new(1, 1));
        assert_eq!(offset_to_line_column(source, 3), LineColumn::new(1, 4));
        assert_eq!(offset_to_line_column(source, 4), LineColumn::new(2, 1));
        assert_eq!(offset_to_line_column(source, 7), LineColumn::new(2, 4));
        assert_eq!(offset_to_line_column(source, 12), LineColumn::new(3, 3));
        assert_eq!(offset_to_line_column(source, 99), LineColumn::new(3, 3));
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(offset_to_line_column("", 0), LineColumn::new(1, 1));
        assert_eq!(line_column_to_offset("", 1, 1), 0);
    }

    #[test]
    fn test_unicode_columns() {
        let source = "αβγ\nδε";

        assert_eq!(offset_to_line_column(source, 2), LineColumn::new(1, 2));
        assert_eq!(offset_to_line_column(source, 3), LineColumn::new(1, 2));
        assert_eq!(offset_to_line_column(source, 7), LineColumn::new(2, 1));
        assert_eq!(line_column_to_offset(source, 2, 2), 9);
    }

    #[test]
    fn test_line_column_to_offset_clamps() {
        let source = "abc\ndefgh\nij";

        assert_eq!(line_column_to_offset(source, 1, 99), 3);
        assert_eq!(line_column_to_offset(source, 2, 1), 4);
        assert_eq!(line_column_to_offset(source, 9, 1), source.len());
        assert_eq!(line_column_to_offset(source, 0, 0), 0);
    }

    #[test]
    fn test_inverse_on_every_boundary() {
        let source = "<p>\n  héllo\r\n</p>\n";
        let table = LineOffsetTable::build(source);

        for (offset, _) in source.char_indices().chain(std::iter::once((source.len(), ' '))) {
            let position = table.offset_to_line_column(source, offset);
            assert_eq!(table.line_column_to_offset(source, position.line, position.column), offset);
        }
    }
}
