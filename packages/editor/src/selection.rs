//! Mapping between code editor positions and tree nodes

use crate::{Document, EditorError};
use htmled_core_ast::{LineColumn, LineOffsetTable, NodeId, Span};
use serde::{Deserialize, Serialize};

/// 1-based line/column range in the document source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRange {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl CodeRange {
    pub fn from_span(lines: &LineOffsetTable, source: &str, span: Span) -> Self {
        let start = lines.offset_to_line_column(source, span.start);
        let end = lines.offset_to_line_column(source, span.end);
        Self::new(start, end)
    }

    pub fn new(start: LineColumn, end: LineColumn) -> Self {
        Self {
            start_line: start.line,
            start_column: start.column,
            end_line: end.line,
            end_column: end.column,
        }
    }

    pub fn start(&self) -> LineColumn {
        LineColumn::new(self.start_line, self.start_column)
    }

    pub fn end(&self) -> LineColumn {
        LineColumn::new(self.end_line, self.end_column)
    }
}

impl Document {
    /// Where a node sits in the current source
    pub fn node_range(&self, id: &str) -> Option<CodeRange> {
        let span = self.index.range(id)?;
        Some(CodeRange::from_span(&self.lines, &self.source, span))
    }

    /// Innermost element whose source range contains `offset`
    pub fn node_at_offset(&self, offset: usize) -> Option<&NodeId> {
        self.index.element_at_offset(offset)
    }

    pub fn node_at_position(&self, line: usize, column: usize) -> Option<&NodeId> {
        let offset = self.lines.line_column_to_offset(&self.source, line, column);
        self.node_at_offset(offset)
    }

    pub fn offset_to_position(&self, offset: usize) -> LineColumn {
        self.lines.offset_to_line_column(&self.source, offset)
    }

    /// Select a node by identity, or clear the selection with `None`
    pub fn select(&mut self, id: Option<&str>) -> Result<(), EditorError> {
        self.selected = match id {
            Some(id) if self.index.contains(id) => Some(NodeId::from(id)),
            Some(id) => return Err(EditorError::UnknownNode(id.to_string())),
            None => None,
        };
        Ok(())
    }

    /// Select whatever sits under the cursor
    pub fn select_at_position(&mut self, line: usize, column: usize) -> Option<&NodeId> {
        self.selected = self.node_at_position(line, column).cloned();
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// Source range of the selected node, for highlighting
    pub fn selected_range(&self) -> Option<CodeRange> {
        self.node_range(self.selected.as_ref()?.as_str())
    }
}
