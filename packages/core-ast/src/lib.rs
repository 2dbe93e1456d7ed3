//! # htmled core AST
//!
//! Markup in, identity-stable tree out, markup back again.
//!
//! ```text
//! text ──parse──▶ Root ──assign_identities──▶ ──normalize──▶ build_index
//!                  ▲                                              │
//!                  │        apply_patch / move_node               ▼
//!                  └──────────── serialize ◀──────────── collaborators
//! ```
//!
//! Every operation is synchronous and works on a caller-owned `&mut Root`.
//! The only generation state is the [`IdGenerator`] the caller passes in.

pub mod ast;
pub mod diff;
pub mod entities;
pub mod error;
pub mod id_generator;
pub mod identity;
pub mod index;
pub mod lexer;
pub mod move_node;
pub mod normalize;
pub mod parser;
pub mod position;
pub mod serializer;
pub mod tags;
pub mod visitor;

pub use ast::{
    Comment, Element, Node, NodeId, NodePath, Properties, PropertyValue, Root, Span, Text,
    ID_ATTRIBUTE,
};
pub use diff::{apply_patch, detect_changes, replace_node_by_id, ChangeSignal};
pub use error::{EditError, EditResult, ParseIssue, ParseIssueKind};
pub use id_generator::{get_document_id, IdGenerator};
pub use identity::{assign_identities, find_element, find_element_mut, find_path};
pub use index::{build_index, NodeIndex};
pub use move_node::move_node;
pub use normalize::normalize;
pub use parser::{parse, parse_with_issues, ParseOutput, MAX_NESTING_DEPTH};
pub use position::{line_column_to_offset, offset_to_line_column, LineColumn, LineOffsetTable};
pub use serializer::{serialize, serialize_with_ranges, SerializeOptions};
pub use visitor::{walk, walk_mut, Visitor, VisitorMut, Walk};

#[cfg(feature = "pretty-errors")]
pub use error::format_issues;
