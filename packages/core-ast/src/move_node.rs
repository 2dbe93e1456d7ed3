use crate::ast::{NodePath, Root};
use crate::error::{EditError, EditResult};
use crate::identity::find_path;
use tracing::{debug, instrument};

/// Detach the element `node_id` and reattach it under `new_parent_id` (the
/// root when `None`) at `index`, clamped to the parent's child count after
/// the detach. Returns the final position.
///
/// Everything is validated before the tree is touched, so an error always
/// leaves it unchanged.
#[instrument(skip(root))]
pub fn move_node(
    root: &mut Root,
    node_id: &str,
    new_parent_id: Option<&str>,
    index: usize,
) -> EditResult<usize> {
    let node_path = find_path(root, node_id).ok_or_else(|| EditError::not_found(node_id))?;

    let target_path = match new_parent_id {
        Some(parent_id) => {
            let path = find_path(root, parent_id).ok_or_else(|| EditError::not_found(parent_id))?;
            if node_path.is_prefix_of(&path) {
                return Err(EditError::cycle(node_id, parent_id));
            }
            path
        }
        None => NodePath::root(),
    };

    let Some((source_parent, position)) = node_path.split_last() else {
        return Err(EditError::not_found(node_id));
    };
    let target_path = target_path.after_removal(&node_path);

    let source_children = root
        .children_at_mut(&source_parent)
        .ok_or_else(|| EditError::not_found(node_id))?;
    let detached = source_children.remove(position);

    match root.children_at_mut(&target_path) {
        Some(children) => {
            let at = index.min(children.len());
            children.insert(at, detached);
            debug!(from = %node_path, to = %target_path, at, "moved node");
            Ok(at)
        }
        None => {
            // Unreachable for a validated target; put the node back as it was
            if let Some(children) = root.children_at_mut(&source_parent) {
                children.insert(position, detached);
            }
            Err(EditError::not_found(new_parent_id.unwrap_or(node_id)))
        }
    }
}
