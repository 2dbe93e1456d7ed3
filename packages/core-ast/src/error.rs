use crate::ast::{NodeId, Span};
use thiserror::Error;

pub type EditResult<T> = Result<T, EditError>;

/// Structural edit failures. The tree is left unchanged whenever one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("Cannot move {node} into {target}: target is inside the moved subtree")]
    Cycle { node: NodeId, target: NodeId },
}

impl EditError {
    pub fn not_found(id: impl Into<NodeId>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn cycle(node: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self::Cycle {
            node: node.into(),
            target: target.into(),
        }
    }
}

/// What the parser recovered from
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseIssueKind {
    #[error("unescaped `<` treated as text")]
    UnescapedLessThan,

    #[error("unexpected character inside tag")]
    UnexpectedCharacter,

    #[error("end of input inside tag")]
    EofInTag,

    #[error("end of input inside comment")]
    EofInComment,

    #[error("empty comment closed abruptly")]
    AbruptEmptyComment,

    #[error("doctype ignored in fragment")]
    IgnoredDoctype,

    #[error("duplicate attribute `{0}` ignored")]
    DuplicateAttribute(String),

    #[error("self-closing syntax on non-void element `{0}` ignored")]
    SelfClosingNonVoid(String),

    #[error("end tag `{0}` has no open element")]
    StrayEndTag(String),

    #[error("element `{0}` closed implicitly")]
    UnclosedElement(String),

    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// Non-fatal parse diagnostic
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {}..{}", .span.start, .span.end)]
pub struct ParseIssue {
    pub kind: ParseIssueKind,
    pub span: Span,
}

impl ParseIssue {
    pub fn new(kind: ParseIssueKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn stray_end_tag(name: impl Into<String>, span: Span) -> Self {
        Self::new(ParseIssueKind::StrayEndTag(name.into()), span)
    }

    pub fn unclosed(name: impl Into<String>, span: Span) -> Self {
        Self::new(ParseIssueKind::UnclosedElement(name.into()), span)
    }

    pub fn duplicate_attribute(name: impl Into<String>, span: Span) -> Self {
        Self::new(ParseIssueKind::DuplicateAttribute(name.into()), span)
    }
}

/// Render parse issues as annotated source snippets
#[cfg(feature = "pretty-errors")]
pub fn format_issues(source: &str, filename: &str, issues: &[ParseIssue]) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let mut output = Vec::new();

    for issue in issues {
        // ariadne counts characters, spans count bytes
        let start = char_offset(source, issue.span.start);
        let end = char_offset(source, issue.span.end).max(start);

        let report = Report::build(ReportKind::Warning, filename, start)
            .with_message(issue.kind.to_string())
            .with_label(
                Label::new((filename, start..end))
                    .with_message("recovered here")
                    .with_color(Color::Yellow),
            )
            .finish();

        if report
            .write((filename, Source::from(source)), &mut output)
            .is_err()
        {
            break;
        }
    }

    String::from_utf8_lossy(&output).into_owned()
}

#[cfg(feature = "pretty-errors")]
fn char_offset(source: &str, byte: usize) -> usize {
    let mut byte = byte.min(source.len());
    while !source.is_char_boundary(byte) {
        byte -= 1;
    }
    source[..byte].chars().count()
}
