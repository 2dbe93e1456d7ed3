//! # Tree Mutations
//!
//! Structural edits a canvas or outline panel sends to a [`Document`](crate::Document).
//!
//! ### ReplaceNode
//! - Swaps the element carrying `node_id` for a new one at the same position
//! - A replacement without identity inherits `node_id`
//! - Fails if any identity in the replacement is already used elsewhere
//!
//! ### MoveNode
//! - Detaches the subtree and reattaches it under `new_parent_id`, or the
//!   root when `None`
//! - The index is clamped to the target's child count after detaching
//! - Fails if the target is the node itself or one of its descendants
//!
//! Every mutation is validated before the tree is touched.

use htmled_core_ast::{
    apply_patch, find_path, move_node, EditError, Element, Node, NodeId, Root,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    /// Replace an element wholesale
    #[serde(rename_all = "camelCase")]
    ReplaceNode { node_id: NodeId, element: Element },

    /// Move an element to a new parent at index
    #[serde(rename_all = "camelCase")]
    MoveNode {
        node_id: NodeId,
        new_parent_id: Option<NodeId>,
        index: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Would create cycle: {node} cannot move into {target}")]
    CycleDetected { node: String, target: String },

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

impl From<EditError> for MutationError {
    fn from(error: EditError) -> Self {
        match error {
            EditError::NotFound(id) => MutationError::NodeNotFound(id.to_string()),
            EditError::Cycle { node, target } => MutationError::CycleDetected {
                node: node.to_string(),
                target: target.to_string(),
            },
        }
    }
}

/// What the tree looks like after a successful mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Replaced { previous: Element },
    Moved { index: usize },
}

impl Mutation {
    pub fn node_id(&self) -> &NodeId {
        match self {
            Mutation::ReplaceNode { node_id, .. } | Mutation::MoveNode { node_id, .. } => node_id,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Apply mutation to the tree with validation
    pub fn apply(self, root: &mut Root) -> Result<Applied, MutationError> {
        self.validate(root)?;

        match self {
            Mutation::ReplaceNode {
                node_id,
                mut element,
            } => {
                if element.id.is_none() {
                    element.id = Some(node_id.clone());
                }
                let previous = apply_patch(root, node_id.as_str(), element)?;
                Ok(Applied::Replaced { previous })
            }

            Mutation::MoveNode {
                node_id,
                new_parent_id,
                index,
            } => {
                let index = move_node(
                    root,
                    node_id.as_str(),
                    new_parent_id.as_ref().map(NodeId::as_str),
                    index,
                )?;
                Ok(Applied::Moved { index })
            }
        }
    }

    /// Check the mutation against the tree without changing it
    pub fn validate(&self, root: &Root) -> Result<(), MutationError> {
        match self {
            Mutation::ReplaceNode { node_id, element } => {
                let target = find_path(root, node_id.as_str())
                    .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;

                let mut seen = HashSet::new();
                for (depth, id) in subtree_identities(element) {
                    if !seen.insert(id) {
                        return Err(MutationError::InvalidStructure(format!(
                            "identity {} appears twice in the replacement",
                            id
                        )));
                    }
                    if depth == 0 && id == node_id {
                        continue;
                    }
                    // Reusing an identity from the replaced subtree is fine
                    let clashes = find_path(root, id.as_str())
                        .is_some_and(|path| !target.is_prefix_of(&path));
                    if clashes {
                        return Err(MutationError::InvalidStructure(format!(
                            "identity {} is already used in the document",
                            id
                        )));
                    }
                }
                Ok(())
            }

            Mutation::MoveNode {
                node_id,
                new_parent_id,
                ..
            } => {
                let node = find_path(root, node_id.as_str())
                    .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;

                if let Some(parent_id) = new_parent_id {
                    let parent = find_path(root, parent_id.as_str())
                        .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;
                    if node.is_prefix_of(&parent) {
                        return Err(MutationError::CycleDetected {
                            node: node_id.to_string(),
                            target: parent_id.to_string(),
                        });
                    }
                }
                Ok(())
            }
        }
    }
}

/// Identities inside an element subtree with their depth, pre-order
fn subtree_identities(element: &Element) -> Vec<(usize, &NodeId)> {
    let mut found = Vec::new();
    let mut stack = vec![(0, element)];

    while let Some((depth, element)) = stack.pop() {
        if let Some(id) = &element.id {
            found.push((depth, id));
        }
        for child in element.children.iter().rev() {
            if let Node::Element(child) = child {
                stack.push((depth + 1, child));
            }
        }
    }

    found
}
