use crate::ast::{Comment, Element, Node, NodePath, Root, Text};

/// What a walk does after visiting an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    SkipChildren,
    Stop,
}

/// Read-only pre-order traversal.
///
/// Override the `visit_*` methods you care about; [`walk`] drives them in
/// document order with an explicit stack, passing each node's path.
pub trait Visitor<'a> {
    fn visit_element(&mut self, _element: &'a Element, _path: &NodePath) -> Walk {
        Walk::Continue
    }

    fn visit_text(&mut self, _text: &'a Text, _path: &NodePath) {}

    fn visit_comment(&mut self, _comment: &'a Comment, _path: &NodePath) {}
}

/// Mutable pre-order traversal. Nodes may be edited in place but the walk
/// descends into whatever children an element has after its visit.
pub trait VisitorMut {
    fn visit_element_mut(&mut self, _element: &mut Element) -> Walk {
        Walk::Continue
    }

    fn visit_text_mut(&mut self, _text: &mut Text) {}

    fn visit_comment_mut(&mut self, _comment: &mut Comment) {}
}

pub fn walk<'a, V: Visitor<'a>>(root: &'a Root, visitor: &mut V) {
    let mut stack: Vec<(&'a Node, NodePath)> = root
        .children
        .iter()
        .enumerate()
        .rev()
        .map(|(index, node)| (node, NodePath::root().child(index)))
        .collect();

    while let Some((node, path)) = stack.pop() {
        match node {
            Node::Element(element) => match visitor.visit_element(element, &path) {
                Walk::Continue => {
                    for (index, child) in element.children.iter().enumerate().rev() {
                        stack.push((child, path.child(index)));
                    }
                }
                Walk::SkipChildren => {}
                Walk::Stop => return,
            },
            Node::Text(text) => visitor.visit_text(text, &path),
            Node::Comment(comment) => visitor.visit_comment(comment, &path),
        }
    }
}

pub fn walk_mut<V: VisitorMut>(root: &mut Root, visitor: &mut V) {
    let mut stack: Vec<&mut Node> = root.children.iter_mut().rev().collect();

    while let Some(node) = stack.pop() {
        match node {
            Node::Element(element) => match visitor.visit_element_mut(element) {
                Walk::Continue => stack.extend(element.children.iter_mut().rev()),
                Walk::SkipChildren => {}
                Walk::Stop => return,
            },
            Node::Text(text) => visitor.visit_text_mut(text),
            Node::Comment(comment) => visitor.visit_comment_mut(comment),
        }
    }
}

/// Every element in document order
pub fn elements(root: &Root) -> Vec<&Element> {
    struct Collect<'a>(Vec<&'a Element>);

    impl<'a> Visitor<'a> for Collect<'a> {
        fn visit_element(&mut self, element: &'a Element, _path: &NodePath) -> Walk {
            self.0.push(element);
            Walk::Continue
        }
    }

    let mut collect = Collect(Vec::new());
    walk(root, &mut collect);
    collect.0
}
