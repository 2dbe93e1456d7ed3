//! # Document Handle
//!
//! A Document is one markup file and its editing state. Two paths keep the
//! source text and the tree in sync:
//!
//! ```text
//! code editor ──update_source──▶ parse → assign → normalize → index
//! canvas      ──apply(Mutation)─▶ edit tree → serialize → re-stamp ranges → index
//! ```
//!
//! Documents are either memory-backed or file-backed; only the latter can
//! be saved.

use crate::mutations::{Applied, Mutation};
use crate::EditorError;
use htmled_core_ast::{
    assign_identities, build_index, detect_changes, normalize, parse_with_issues,
    serialize_with_ranges, walk_mut, ChangeSignal, Comment, Element, IdGenerator,
    LineOffsetTable, NodeId, NodeIndex, ParseIssue, Root, SerializeOptions, Span, Text,
    VisitorMut, Walk,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Storage backend for a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStorage {
    /// In-memory only (tests, scratch documents)
    Memory,

    /// Single-user editing with disk persistence
    File { path: PathBuf, dirty: bool },
}

/// Outcome of [`Document::apply`]
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    pub version: u64,
    pub applied: Applied,
    /// Identities stamped onto elements the mutation brought in
    pub assigned: usize,
}

#[derive(Debug)]
pub struct Document {
    /// Increments on every accepted change
    pub version: u64,

    pub(crate) source: String,
    pub(crate) root: Root,
    pub(crate) index: NodeIndex,
    pub(crate) lines: LineOffsetTable,
    pub(crate) selected: Option<NodeId>,
    issues: Vec<ParseIssue>,
    ids: IdGenerator,
    options: SerializeOptions,
    storage: DocumentStorage,
}

impl Document {
    /// Memory-backed document from source text
    pub fn from_source(source: impl Into<String>) -> Self {
        Self::with_options(source, SerializeOptions::default())
    }

    pub fn with_options(source: impl Into<String>, options: SerializeOptions) -> Self {
        Self::build(source.into(), IdGenerator::new(), options, DocumentStorage::Memory)
    }

    /// File-backed document. Identities are prefixed with a hash of the path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let ids = IdGenerator::for_document(&path.to_string_lossy());

        Ok(Self::build(
            source,
            ids,
            SerializeOptions::default(),
            DocumentStorage::File {
                path: path.to_path_buf(),
                dirty: false,
            },
        ))
    }

    fn build(
        source: String,
        ids: IdGenerator,
        options: SerializeOptions,
        storage: DocumentStorage,
    ) -> Self {
        let mut document = Self {
            version: 0,
            source: String::new(),
            root: Root::new(),
            index: NodeIndex::default(),
            lines: LineOffsetTable::build(""),
            selected: None,
            issues: Vec::new(),
            ids,
            options,
            storage,
        };
        let root = document.prepare(&source);
        document.install(source, root);
        document
    }

    /// Parse, identify and normalize `source` with this document's generator.
    ///
    /// The generator restarts for every parse so unchanged markup maps to
    /// unchanged identities.
    fn prepare(&mut self, source: &str) -> Root {
        let output = parse_with_issues(source);
        let mut root = output.root;
        self.issues = output.issues;
        self.ids.reset();
        assign_identities(&mut root, &mut self.ids);
        normalize(&mut root);
        root
    }

    fn install(&mut self, source: String, root: Root) {
        self.lines = LineOffsetTable::build(&source);
        self.index = build_index(&root);
        self.source = source;
        self.root = root;

        if let Some(selected) = &self.selected {
            if !self.index.contains(selected.as_str()) {
                debug!(id = %selected, "selected node disappeared");
                self.selected = None;
            }
        }
    }

    /// Code editor path: replace the source and rebuild the tree.
    ///
    /// Returns a reparse signal when the set of identities changed.
    #[instrument(skip(self, source), fields(version = self.version))]
    pub fn update_source(&mut self, source: impl Into<String>) -> Option<ChangeSignal> {
        let source = source.into();
        let root = self.prepare(&source);
        let signal = detect_changes(&self.root, &root);

        self.install(source, root);
        self.touch();
        signal
    }

    /// Canvas path: apply a structural mutation and regenerate the source
    #[instrument(skip(self, mutation), fields(version = self.version, node = %mutation.node_id()))]
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let applied = mutation.apply(&mut self.root)?;
        let assigned = assign_identities(&mut self.root, &mut self.ids);

        let (source, ranges) = serialize_with_ranges(&self.root, &self.options);
        let mut root = std::mem::take(&mut self.root);
        walk_mut(&mut root, &mut RestampRanges { ranges: &ranges });

        self.issues.clear();
        self.install(source, root);
        self.touch();

        debug!(version = self.version, assigned, "applied mutation");
        Ok(MutationResult {
            version: self.version,
            applied,
            assigned,
        })
    }

    /// Parse and apply a JSON-encoded mutation
    pub fn apply_json(&mut self, json: &str) -> Result<MutationResult, EditorError> {
        let mutation = Mutation::from_json(json)?;
        self.apply(mutation)
    }

    fn touch(&mut self) {
        self.version += 1;
        if let DocumentStorage::File { dirty, .. } = &mut self.storage {
            *dirty = true;
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Root {
        &self.root
    }

    pub fn index(&self) -> &NodeIndex {
        &self.index
    }

    /// Issues recovered while parsing the current source
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.index.element(&self.root, id)
    }

    pub fn options(&self) -> &SerializeOptions {
        &self.options
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.storage {
            DocumentStorage::File { path, .. } => Some(path),
            DocumentStorage::Memory => None,
        }
    }

    pub fn storage(&self) -> &DocumentStorage {
        &self.storage
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        matches!(self.storage, DocumentStorage::File { dirty: true, .. })
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        match &mut self.storage {
            DocumentStorage::File { path, dirty } => {
                std::fs::write(&*path, &self.source)?;
                *dirty = false;
                Ok(())
            }
            DocumentStorage::Memory => Err(EditorError::NotFileBacked),
        }
    }
}

/// Point element spans at the regenerated source. Text and comment spans
/// no longer describe anything and are cleared.
struct RestampRanges<'r> {
    ranges: &'r HashMap<NodeId, Span>,
}

impl VisitorMut for RestampRanges<'_> {
    fn visit_element_mut(&mut self, element: &mut Element) -> Walk {
        element.span = element
            .id
            .as_ref()
            .and_then(|id| self.ranges.get(id))
            .copied();
        Walk::Continue
    }

    fn visit_text_mut(&mut self, text: &mut Text) {
        text.span = None;
    }

    fn visit_comment_mut(&mut self, comment: &mut Comment) {
        comment.span = None;
    }
}
