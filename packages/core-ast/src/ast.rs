use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Reserved attribute key that carries an element's identity in markup.
///
/// The parser lifts this attribute into [`Element::id`], so it never appears
/// in a property bag, and the serializer writes it back at most once.
pub const ID_ATTRIBUTE: &str = "data-id";

/// Byte range into the source text a node was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inclusive on both ends, so a cursor sitting right after a closing
    /// tag still belongs to that element.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Smallest span covering both
    pub fn join(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Element identity, unique within a tree once identities are assigned
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Valueless attribute (`disabled`) when true; omitted when false
    Boolean(bool),

    /// Numeric attribute (`colspan="2"`)
    Number(f64),

    /// Plain string attribute
    String(String),

    /// Space-separated token list (`class="a b"`)
    Tokens(Vec<String>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

/// Ordered attribute bag. Insertion order is kept and names are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(Vec<(String, PropertyValue)>);

impl Properties {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or overwrite in place. Returns the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        let position = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(position).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Element node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub tag_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,

    #[serde(default)]
    pub properties: Properties,

    #[serde(default)]
    pub children: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            id: None,
            properties: Properties::new(),
            children: Vec::new(),
            span: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.set_property(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Set an attribute. The reserved identity key is routed to [`Element::id`].
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        let value = value.into();
        if name == ID_ATTRIBUTE {
            if let PropertyValue::String(id) = value {
                self.id = Some(NodeId::new(id));
            }
            return;
        }
        self.properties.insert(name, value);
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// Text node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

/// Comment node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

/// Any node that can appear in a child list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    Text(Text),
    Comment(Comment),
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text {
            value: value.into(),
            span: None,
        })
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Node::Comment(Comment {
            value: value.into(),
            span: None,
        })
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(&text.value),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Text(_) | Node::Comment(_) => &[],
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Node::Element(element) => element.span,
            Node::Text(text) => text.span,
            Node::Comment(comment) => comment.span,
        }
    }

    pub fn id(&self) -> Option<&NodeId> {
        match self {
            Node::Element(element) => element.id.as_ref(),
            Node::Text(_) | Node::Comment(_) => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Position of a node as child indices from the root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The path of the root itself
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }

    /// Parent path and position within the parent, `None` for the root path
    pub fn split_last(&self) -> Option<(NodePath, usize)> {
        let (&last, parent) = self.0.split_last()?;
        Some((NodePath(parent.to_vec()), last))
    }

    /// True when `self` is `other` or one of its ancestors
    pub fn is_prefix_of(&self, other: &NodePath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Rewrite this path as it reads after the node at `removed` is
    /// detached from its parent. Paths inside `removed` are not meaningful.
    pub fn after_removal(mut self, removed: &NodePath) -> NodePath {
        if let Some((&position, parent)) = removed.0.split_last() {
            let depth = parent.len();
            if self.0.len() > depth
                && self.0[..depth] == *parent
                && self.0[depth] > position
            {
                self.0[depth] -= 1;
            }
        }
        self
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}

/// Document root. Holds the top-level nodes of a fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub children: Vec<Node>,
}

impl Root {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    pub fn with_children(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn node_at(&self, path: &NodePath) -> Option<&Node> {
        let (&last, parents) = path.indices().split_last()?;
        let mut children = &self.children;
        for &index in parents {
            match children.get(index)? {
                Node::Element(element) => children = &element.children,
                _ => return None,
            }
        }
        children.get(last)
    }

    pub fn element_at(&self, path: &NodePath) -> Option<&Element> {
        self.node_at(path).and_then(Node::as_element)
    }

    pub fn element_at_mut(&mut self, path: &NodePath) -> Option<&mut Element> {
        let (&last, parents) = path.indices().split_last()?;
        let mut children = &mut self.children;
        for &index in parents {
            match children.get_mut(index)? {
                Node::Element(element) => children = &mut element.children,
                _ => return None,
            }
        }
        children.get_mut(last)?.as_element_mut()
    }

    /// Child list of the root (empty path) or of the element at `path`
    pub fn children_at(&self, path: &NodePath) -> Option<&Vec<Node>> {
        if path.is_root() {
            return Some(&self.children);
        }
        self.element_at(path).map(|element| &element.children)
    }

    pub fn children_at_mut(&mut self, path: &NodePath) -> Option<&mut Vec<Node>> {
        if path.is_root() {
            return Some(&mut self.children);
        }
        self.element_at_mut(path).map(|element| &mut element.children)
    }

    /// Structural equality: tags, identities, attributes, text, comments and
    /// nesting. Source spans are ignored.
    pub fn structurally_eq(&self, other: &Root) -> bool {
        let mut pending: Vec<(&[Node], &[Node])> = vec![(&self.children, &other.children)];

        while let Some((left, right)) = pending.pop() {
            if left.len() != right.len() {
                return false;
            }
            for (a, b) in left.iter().zip(right) {
                match (a, b) {
                    (Node::Element(a), Node::Element(b)) => {
                        if a.tag_name != b.tag_name
                            || a.id != b.id
                            || a.properties != b.properties
                        {
                            return false;
                        }
                        pending.push((&a.children, &b.children));
                    }
                    (Node::Text(a), Node::Text(b)) if a.value == b.value => {}
                    (Node::Comment(a), Node::Comment(b)) if a.value == b.value => {}
                    _ => return false,
                }
            }
        }

        true
    }
}
