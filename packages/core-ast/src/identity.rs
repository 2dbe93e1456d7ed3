use crate::ast::{Element, NodeId, NodePath, Root};
use crate::id_generator::IdGenerator;
use crate::visitor::{walk, walk_mut, Visitor, VisitorMut, Walk};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Give every element without an identity a fresh one from `ids`.
///
/// Existing identities are kept. When markup carries the same identity on
/// several elements, the first in document order keeps it and the rest are
/// re-stamped. Generated values that already occur in the tree are skipped.
/// Returns the number of identities written.
#[instrument(skip_all)]
pub fn assign_identities(root: &mut Root, ids: &mut IdGenerator) -> usize {
    let mut taken = ExistingIds(HashSet::new());
    walk(root, &mut taken);

    let mut stamper = Stamper {
        ids,
        taken: taken.0,
        seen: HashSet::new(),
        assigned: 0,
    };
    walk_mut(root, &mut stamper);

    debug!(assigned = stamper.assigned, "assigned identities");
    stamper.assigned
}

struct ExistingIds(HashSet<NodeId>);

impl<'a> Visitor<'a> for ExistingIds {
    fn visit_element(&mut self, element: &'a Element, _path: &NodePath) -> Walk {
        if let Some(id) = &element.id {
            self.0.insert(id.clone());
        }
        Walk::Continue
    }
}

struct Stamper<'g> {
    ids: &'g mut IdGenerator,
    taken: HashSet<NodeId>,
    seen: HashSet<NodeId>,
    assigned: usize,
}

impl Stamper<'_> {
    fn fresh(&mut self) -> NodeId {
        loop {
            let id = self.ids.new_id();
            if self.taken.insert(id.clone()) {
                return id;
            }
        }
    }
}

impl VisitorMut for Stamper<'_> {
    fn visit_element_mut(&mut self, element: &mut Element) -> Walk {
        let keep = match &element.id {
            Some(id) if self.seen.insert(id.clone()) => true,
            Some(id) => {
                warn!(id = %id, tag = %element.tag_name, "duplicate identity re-stamped");
                false
            }
            None => false,
        };

        if !keep {
            let id = self.fresh();
            self.seen.insert(id.clone());
            element.id = Some(id);
            self.assigned += 1;
        }

        Walk::Continue
    }
}

/// Path of the element with this identity
pub fn find_path(root: &Root, id: &str) -> Option<NodePath> {
    struct Find<'i> {
        id: &'i str,
        found: Option<NodePath>,
    }

    impl<'a> Visitor<'a> for Find<'_> {
        fn visit_element(&mut self, element: &'a Element, path: &NodePath) -> Walk {
            if element.id.as_ref().is_some_and(|candidate| candidate.as_str() == self.id) {
                self.found = Some(path.clone());
                return Walk::Stop;
            }
            Walk::Continue
        }
    }

    let mut find = Find { id, found: None };
    walk(root, &mut find);
    find.found
}

pub fn find_element<'a>(root: &'a Root, id: &str) -> Option<&'a Element> {
    let path = find_path(root, id)?;
    root.element_at(&path)
}

pub fn find_element_mut<'a>(root: &'a mut Root, id: &str) -> Option<&'a mut Element> {
    let path = find_path(root, id)?;
    root.element_at_mut(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::visitor::elements;

    fn ids(root: &Root) -> Vec<String> {
        elements(root)
            .iter()
            .map(|e| e.id.as_ref().map(|id| id.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_assigns_in_document_order() {
        let mut root = parse("<div><p>a</p><p>b</p></div><span></span>");
        let assigned = assign_identities(&mut root, &mut IdGenerator::new());

        assert_eq!(assigned, 4);
        assert_eq!(ids(&root), vec!["node-1", "node-2", "node-3", "node-4"]);
    }

    #[test]
    fn test_keeps_existing_and_skips_taken_values() {
        let mut root = parse(r#"<div><p data-id="node-2"></p><p></p></div>"#);
        assign_identities(&mut root, &mut IdGenerator::new());

        assert_eq!(ids(&root), vec!["node-1", "node-2", "node-3"]);
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let mut root = parse("<ul><li>a</li><li>b</li></ul>");
        let mut generator = IdGenerator::new();
        assign_identities(&mut root, &mut generator);
        let before = root.clone();

        assert_eq!(assign_identities(&mut root, &mut generator), 0);
        assert_eq!(root, before);
    }

    #[test]
    fn test_duplicate_source_identities_are_restamped() {
        let mut root = parse(r#"<p data-id="x"></p><p data-id="x"></p>"#);
        assign_identities(&mut root, &mut IdGenerator::new());

        assert_eq!(ids(&root), vec!["x", "node-1"]);
    }

    #[test]
    fn test_find_element() {
        let mut root = parse(r#"<div><b data-id="target">t</b></div>"#);

        assert_eq!(find_path(&root, "target"), Some(NodePath::from(vec![0, 0])));
        assert_eq!(find_element(&root, "target").map(|e| e.tag_name.as_str()), Some("b"));
        assert!(find_element(&root, "missing").is_none());

        if let Some(element) = find_element_mut(&mut root, "target") {
            element.tag_name = "strong".into();
        }
        assert_eq!(find_element(&root, "target").map(|e| e.tag_name.as_str()), Some("strong"));
    }
}
