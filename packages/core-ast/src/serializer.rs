use crate::ast::{Element, Node, NodeId, PropertyValue, Root, Span, ID_ATTRIBUTE};
use crate::tags;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SerializeOptions {
    /// Escape `& < >` in text. Script and style content is never escaped.
    pub escape_text: bool,

    /// Emit each element's identity as the first attribute
    pub include_identity: bool,

    /// Break lines inside elements that hold only elements and comments
    pub pretty: bool,

    pub indent: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            escape_text: true,
            include_identity: true,
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

/// Tree to markup. Total: every in-memory tree serializes.
#[instrument(skip_all)]
pub fn serialize(root: &Root, options: &SerializeOptions) -> String {
    Serializer::new(options).run(root).0
}

/// Markup plus the output byte range of every identified element
#[instrument(skip_all)]
pub fn serialize_with_ranges(
    root: &Root,
    options: &SerializeOptions,
) -> (String, HashMap<NodeId, Span>) {
    let (output, ranges) = Serializer::new(options).tracking_ranges().run(root);
    (output, ranges.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Default)]
struct Context {
    raw_text: bool,
    preserve_whitespace: bool,
}

enum Work<'a> {
    Node {
        node: &'a Node,
        depth: usize,
        context: Context,
    },
    Close {
        element: &'a Element,
        depth: usize,
        start: usize,
        broken: bool,
    },
    Break(usize),
}

pub struct Serializer<'o> {
    options: &'o SerializeOptions,
    output: String,
    ranges: Option<HashMap<NodeId, Span>>,
}

impl<'o> Serializer<'o> {
    pub fn new(options: &'o SerializeOptions) -> Self {
        Self {
            options,
            output: String::new(),
            ranges: None,
        }
    }

    pub fn tracking_ranges(mut self) -> Self {
        self.ranges = Some(HashMap::new());
        self
    }

    pub fn run(mut self, root: &Root) -> (String, Option<HashMap<NodeId, Span>>) {
        let context = Context::default();
        let mut stack = Vec::new();
        let broken = self.breaks_lines(&root.children, context);
        push_children(&mut stack, &root.children, 0, context, broken, false);

        while let Some(work) = stack.pop() {
            match work {
                Work::Node { node, depth, context } => match node {
                    Node::Element(element) => {
                        self.open_element(element, depth, context, &mut stack)
                    }
                    Node::Text(text) => {
                        if context.raw_text || !self.options.escape_text {
                            self.output.push_str(&text.value);
                        } else {
                            push_escaped(&mut self.output, &text.value, false);
                        }
                    }
                    Node::Comment(comment) => {
                        self.output.push_str("<!--");
                        self.output.push_str(&comment.value);
                        self.output.push_str("-->");
                    }
                },
                Work::Close {
                    element,
                    depth,
                    start,
                    broken,
                } => {
                    if broken {
                        self.write_break(depth);
                    }
                    self.output.push_str("</");
                    self.output.push_str(&element.tag_name);
                    self.output.push('>');
                    self.record(element, start);
                }
                Work::Break(depth) => self.write_break(depth),
            }
        }

        (self.output, self.ranges)
    }

    fn open_element<'a>(
        &mut self,
        element: &'a Element,
        depth: usize,
        context: Context,
        stack: &mut Vec<Work<'a>>,
    ) {
        let start = self.output.len();
        self.output.push('<');
        self.output.push_str(&element.tag_name);
        self.write_attributes(element);

        if tags::is_void(&element.tag_name) {
            if !element.children.is_empty() {
                warn!(
                    tag = %element.tag_name,
                    dropped = element.children.len(),
                    "children of void element not emitted"
                );
            }
            self.output.push_str(" />");
            self.record(element, start);
            return;
        }

        self.output.push('>');

        let inner = Context {
            raw_text: context.raw_text || tags::is_raw_text(&element.tag_name),
            preserve_whitespace: context.preserve_whitespace
                || tags::is_whitespace_sensitive(&element.tag_name),
        };
        let broken = self.breaks_lines(&element.children, inner);

        stack.push(Work::Close {
            element,
            depth,
            start,
            broken,
        });
        push_children(stack, &element.children, depth + 1, inner, broken, true);
    }

    fn write_attributes(&mut self, element: &Element) {
        if self.options.include_identity {
            if let Some(id) = &element.id {
                self.write_attribute(ID_ATTRIBUTE, id.as_str());
            }
        }

        for (name, value) in element.properties.iter() {
            if name == ID_ATTRIBUTE {
                continue;
            }
            match value {
                PropertyValue::Boolean(true) => {
                    self.output.push(' ');
                    self.output.push_str(name);
                }
                PropertyValue::Boolean(false) => {}
                PropertyValue::Number(number) => self.write_attribute(name, &number.to_string()),
                PropertyValue::String(value) => self.write_attribute(name, value),
                PropertyValue::Tokens(tokens) => self.write_attribute(name, &tokens.join(" ")),
            }
        }
    }

    fn write_attribute(&mut self, name: &str, value: &str) {
        self.output.push(' ');
        self.output.push_str(name);
        self.output.push_str("=\"");
        push_escaped(&mut self.output, value, true);
        self.output.push('"');
    }

    fn write_break(&mut self, depth: usize) {
        self.output.push('\n');
        for _ in 0..depth {
            self.output.push_str(&self.options.indent);
        }
    }

    fn breaks_lines(&self, children: &[Node], context: Context) -> bool {
        self.options.pretty
            && !context.preserve_whitespace
            && !children.is_empty()
            && children.iter().all(|child| !matches!(child, Node::Text(_)))
    }

    fn record(&mut self, element: &Element, start: usize) {
        if let (Some(ranges), Some(id)) = (self.ranges.as_mut(), element.id.as_ref()) {
            ranges.insert(id.clone(), Span::new(start, self.output.len()));
        }
    }
}

/// Queue children in reverse so they pop in document order
fn push_children<'a>(
    stack: &mut Vec<Work<'a>>,
    children: &'a [Node],
    depth: usize,
    context: Context,
    broken: bool,
    leading_break: bool,
) {
    for (index, node) in children.iter().enumerate().rev() {
        stack.push(Work::Node {
            node,
            depth,
            context,
        });
        if broken && (leading_break || index > 0) {
            stack.push(Work::Break(depth));
        }
    }
}

fn push_escaped(output: &mut String, value: &str, attribute: bool) {
    for ch in value.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '"' if attribute => output.push_str("&quot;"),
            '<' if !attribute => output.push_str("&lt;"),
            '>' if !attribute => output.push_str("&gt;"),
            _ => output.push(ch),
        }
    }
}
