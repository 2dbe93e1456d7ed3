use crate::ast::{Element, NodeId, NodePath, Root, Span};
use crate::visitor::{walk, Visitor, Walk};
use serde::Serialize;
use std::collections::HashMap;
use tracing::instrument;

/// Lookup tables derived from one tree snapshot.
///
/// Paths resolve against the snapshot the index was built from; rebuild
/// after any structural edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeIndex {
    by_id: HashMap<NodeId, NodePath>,
    by_text_range: HashMap<NodeId, Span>,
    order: Vec<NodeId>,
}

#[instrument(skip_all)]
pub fn build_index(root: &Root) -> NodeIndex {
    let mut index = NodeIndex::default();
    walk(root, &mut index);
    index
}

impl<'a> Visitor<'a> for NodeIndex {
    fn visit_element(&mut self, element: &'a Element, path: &NodePath) -> Walk {
        if let Some(id) = &element.id {
            if !self.by_id.contains_key(id) {
                self.by_id.insert(id.clone(), path.clone());
                if let Some(span) = element.span {
                    self.by_text_range.insert(id.clone(), span);
                }
                self.order.push(id.clone());
            }
        }
        Walk::Continue
    }
}

impl NodeIndex {
    pub fn by_id(&self) -> &HashMap<NodeId, NodePath> {
        &self.by_id
    }

    pub fn by_text_range(&self) -> &HashMap<NodeId, Span> {
        &self.by_text_range
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn path(&self, id: &str) -> Option<&NodePath> {
        self.by_id.get(id)
    }

    pub fn range(&self, id: &str) -> Option<Span> {
        self.by_text_range.get(id).copied()
    }

    /// Identities in document order
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.order.iter()
    }

    /// Resolve an identity against the snapshot
    pub fn element<'t>(&self, root: &'t Root, id: &str) -> Option<&'t Element> {
        root.element_at(self.path(id)?)
    }

    /// Innermost element whose range contains `offset`
    pub fn element_at_offset(&self, offset: usize) -> Option<&NodeId> {
        let mut best: Option<(&NodeId, usize)> = None;

        for id in &self.order {
            let Some(span) = self.by_text_range.get(id) else {
                continue;
            };
            if !span.contains(offset) {
                continue;
            }
            // Later in document order wins ties, which is the deeper element
            if best.map_or(true, |(_, len)| span.len() <= len) {
                best = Some((id, span.len()));
            }
        }

        best.map(|(id, _)| id)
    }
}
