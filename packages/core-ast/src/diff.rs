use crate::ast::{Element, NodeId, NodePath, Root};
use crate::error::{EditError, EditResult};
use crate::identity::find_path;
use crate::visitor::{walk, Visitor, Walk};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Coarse result of comparing two trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeSignal {
    /// The identity sets differ; treat the document as new
    ReparseRequired,
}

/// Replace the element with identity `id` in place, returning the old one.
/// Fails with `NotFound` and leaves the tree untouched when no element has it.
#[instrument(skip(root, element), fields(tag = %element.tag_name))]
pub fn apply_patch(root: &mut Root, id: &str, element: Element) -> EditResult<Element> {
    let path = find_path(root, id).ok_or_else(|| EditError::not_found(id))?;
    let slot = root
        .element_at_mut(&path)
        .ok_or_else(|| EditError::not_found(id))?;

    let replaced = std::mem::replace(slot, element);
    debug!(id, "patched element");
    Ok(replaced)
}

/// Same as [`apply_patch`]
pub fn replace_node_by_id(root: &mut Root, id: &str, element: Element) -> EditResult<Element> {
    apply_patch(root, id, element)
}

/// Signal a reparse iff the two trees carry different identity sets.
///
/// Attribute and text edits on an unchanged set of identities produce no
/// signal. Elements without an identity are not compared.
#[instrument(skip_all)]
pub fn detect_changes(old: &Root, new: &Root) -> Option<ChangeSignal> {
    let before = identities(old);
    let after = identities(new);

    if before == after {
        return None;
    }

    debug!(
        removed = before.difference(&after).count(),
        added = after.difference(&before).count(),
        "identity set changed"
    );
    Some(ChangeSignal::ReparseRequired)
}

/// Identities present in a tree
pub fn identities(root: &Root) -> HashSet<&NodeId> {
    struct Collect<'a>(HashSet<&'a NodeId>);

    impl<'a> Visitor<'a> for Collect<'a> {
        fn visit_element(&mut self, element: &'a Element, _path: &NodePath) -> Walk {
            if let Some(id) = &element.id {
                self.0.insert(id);
            }
            Walk::Continue
        }
    }

    let mut collect = Collect(HashSet::new());
    walk(root, &mut collect);
    collect.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, PropertyValue};
    use crate::id_generator::IdGenerator;
    use crate::identity::{assign_identities, find_element};
    use crate::parser::parse;

    fn identified(source: &str) -> Root {
        let mut root = parse(source);
        assign_identities(&mut root, &mut IdGenerator::new());
        root
    }

    #[test]
    fn test_patch_replaces_in_place() {
        let mut root = parse(r#"<ul><li data-id="a">1</li><li data-id="b">2</li></ul>"#);
        let replacement = Element::new("li")
            .with_id("b")
            .with_property("class", PropertyValue::Tokens(vec!["done".into()]))
            .with_child(Node::text("two"));

        let old = apply_patch(&mut root, "b", replacement).unwrap();

        assert_eq!(old.children[0].as_text(), Some("2"));
        let ul = root.children[0].as_element().unwrap();
        assert_eq!(ul.children.len(), 2);
        assert_eq!(ul.children[1].children()[0].as_text(), Some("two"));
        assert_eq!(find_element(&root, "a").map(|e| e.children[0].as_text()), Some(Some("1")));
    }

    #[test]
    fn test_patch_missing_identity_leaves_tree() {
        let mut root = identified("<div><p>x</p></div>");
        let before = root.clone();

        let result = replace_node_by_id(&mut root, "nope", Element::new("p"));

        assert_eq!(result, Err(EditError::NotFound("nope".into())));
        assert_eq!(root, before);
    }

    #[test]
    fn test_added_element_requires_reparse() {
        let old = identified("<div><p>One</p></div>");
        let new = identified("<div><p>One</p><p>Two</p></div>");

        assert_eq!(detect_changes(&old, &new), Some(ChangeSignal::ReparseRequired));
    }

    #[test]
    fn test_same_identities_produce_no_signal() {
        let old = identified("<div><p>One</p></div>");
        let new = identified(r#"<section class="x"><p>Changed text</p></section>"#);

        assert_eq!(detect_changes(&old, &new), None);
    }
}
