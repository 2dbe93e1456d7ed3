//! # htmled Editor
//!
//! Document handle for visual markup editing on top of `htmled-core-ast`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ core-ast: markup → tree, identities, index  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Load/save documents                      │
//! │  - Apply mutations with validation          │
//! │  - Keep source and tree in sync             │
//! │  - Map cursor positions to nodes            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ host: code editor, canvas, outline panel    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Tree is source of truth** once loaded; source text is regenerated
//!    after every structural edit
//! 2. **Identities are stable**: every element carries a `data-id` that
//!    survives round trips through the source
//! 3. **Validate, then mutate**: a rejected mutation never leaves a
//!    half-applied tree
//!
//! ## Usage
//!
//! ```rust,ignore
//! use htmled_editor::{Document, Mutation};
//!
//! let mut doc = Document::load("index.html")?;
//!
//! // Drag a node on the canvas
//! doc.apply(Mutation::MoveNode {
//!     node_id: "node-4".into(),
//!     new_parent_id: Some("node-1".into()),
//!     index: 0,
//! })?;
//!
//! // Highlight it in the code editor
//! let range = doc.node_range("node-4");
//!
//! doc.save()?;
//! ```

mod document;
mod errors;
mod mutations;
mod selection;

pub use document::{Document, DocumentStorage, MutationResult};
pub use errors::EditorError;
pub use mutations::{Applied, Mutation, MutationError};
pub use selection::CodeRange;

// Re-export common types for convenience
pub use htmled_core_ast::{ChangeSignal, Element, LineColumn, Node, NodeId, ParseIssue, Root};
