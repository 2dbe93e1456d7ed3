use crate::ast::{Comment, Element, Node, NodeId, PropertyValue, Root, Span, Text, ID_ATTRIBUTE};
use crate::entities::decode_entities;
use crate::error::{ParseIssue, ParseIssueKind};
use crate::lexer::{tokenize, MarkupToken, RawAttribute, StartTag};
use crate::tags;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Open elements deeper than this are not nested further
pub const MAX_NESTING_DEPTH: usize = 512;

/// Tree plus everything the parser had to recover from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutput {
    pub root: Root,
    pub issues: Vec<ParseIssue>,
}

/// Parse a markup fragment. Never fails.
pub fn parse(source: &str) -> Root {
    parse_with_issues(source).root
}

#[instrument(skip(source), fields(len = source.len()))]
pub fn parse_with_issues(source: &str) -> ParseOutput {
    let output = Parser::new(source).parse();
    debug!(
        top_level = output.root.children.len(),
        issues = output.issues.len(),
        "parsed fragment"
    );
    output
}

struct OpenElement {
    element: Element,
    start: usize,
}

/// Tree builder over the token stream. Open elements live on an explicit
/// stack, so input nesting depth never grows the call stack.
pub struct Parser<'src> {
    source: &'src str,
    open: Vec<OpenElement>,
    root: Root,
    issues: Vec<ParseIssue>,
    /// Start tags flattened by the nesting cap whose end tags are still due
    capped: HashMap<String, usize>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            open: Vec::new(),
            root: Root::new(),
            issues: Vec::new(),
            capped: HashMap::new(),
        }
    }

    pub fn parse(mut self) -> ParseOutput {
        let (tokens, lex_issues) = tokenize(self.source);
        self.issues = lex_issues;

        for spanned in tokens {
            let span = spanned.span;
            match spanned.token {
                MarkupToken::Text { value, raw } => {
                    let value = if raw { Cow::Borrowed(value) } else { decode_entities(value) };
                    self.insert_text(value, span);
                }
                MarkupToken::Comment(value) => {
                    self.current_children().push(Node::Comment(Comment {
                        value: value.to_string(),
                        span: Some(span),
                    }));
                }
                MarkupToken::Doctype(_) => {
                    self.issues.push(ParseIssue::new(ParseIssueKind::IgnoredDoctype, span));
                }
                MarkupToken::StartTag(tag) => self.start_tag(tag, span),
                MarkupToken::EndTag(name) => self.end_tag(name, span),
            }
        }

        let end = self.source.len();
        while let Some(open) = self.open.pop() {
            if !tags::has_optional_end_tag(&open.element.tag_name) {
                let span = Span::new(open.start, end);
                self.issues.push(ParseIssue::unclosed(open.element.tag_name.clone(), span));
            }
            self.close(open, end);
        }

        ParseOutput {
            root: self.root,
            issues: self.issues,
        }
    }

    fn current_children(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(open) => &mut open.element.children,
            None => &mut self.root.children,
        }
    }

    fn insert_text(&mut self, value: Cow<'_, str>, span: Span) {
        let children = self.current_children();
        if let Some(Node::Text(last)) = children.last_mut() {
            last.value.push_str(&value);
            last.span = Some(last.span.map_or(span, |s| s.join(span)));
            return;
        }
        children.push(Node::Text(Text {
            value: value.into_owned(),
            span: Some(span),
        }));
    }

    fn start_tag(&mut self, tag: StartTag<'_>, span: Span) {
        let name = tag.name.to_ascii_lowercase();
        self.close_implied_by(&name, span.start);

        let mut element = Element::new(name);
        element.span = Some(span);
        self.apply_attributes(&mut element, tag.attributes);

        if tags::is_void(&element.tag_name) {
            self.current_children().push(Node::Element(element));
            return;
        }

        if tag.self_closing {
            if self.in_foreign_content(&element.tag_name) {
                self.current_children().push(Node::Element(element));
                return;
            }
            self.issues.push(ParseIssue::new(
                ParseIssueKind::SelfClosingNonVoid(element.tag_name.clone()),
                span,
            ));
        }

        if self.open.len() >= MAX_NESTING_DEPTH {
            self.issues.push(ParseIssue::new(
                ParseIssueKind::NestingTooDeep(MAX_NESTING_DEPTH),
                span,
            ));
            if !tag.self_closing {
                *self.capped.entry(element.tag_name.clone()).or_default() += 1;
            }
            self.current_children().push(Node::Element(element));
            return;
        }

        self.open.push(OpenElement {
            element,
            start: span.start,
        });
    }

    fn end_tag(&mut self, name: &str, span: Span) {
        let name = name.to_ascii_lowercase();

        // End tags of capped elements close nothing on the stack
        if let Some(count) = self.capped.get_mut(&name) {
            *count -= 1;
            if *count == 0 {
                self.capped.remove(&name);
            }
            return;
        }

        let Some(index) = self
            .open
            .iter()
            .rposition(|open| open.element.tag_name == name)
        else {
            self.issues.push(ParseIssue::stray_end_tag(name, span));
            return;
        };

        while self.open.len() > index + 1 {
            if let Some(open) = self.open.pop() {
                if !tags::has_optional_end_tag(&open.element.tag_name) {
                    self.issues
                        .push(ParseIssue::unclosed(open.element.tag_name.clone(), span));
                }
                self.close(open, span.start);
            }
        }

        if let Some(open) = self.open.pop() {
            self.close(open, span.end);
        }
    }

    /// Inside `svg` or `math`, or opening one of them
    fn in_foreign_content(&self, name: &str) -> bool {
        tags::is_foreign_root(name)
            || self
                .open
                .iter()
                .any(|open| tags::is_foreign_root(&open.element.tag_name))
    }

    /// Close the elements a start tag ends implicitly
    fn close_implied_by(&mut self, name: &str, at: usize) {
        if tags::closes_paragraph(name) {
            if let Some(index) = self.find_open("p", tags::PARAGRAPH_SCOPE_BOUNDARIES) {
                self.close_down_to(index, at);
            }
        }

        if let Some((siblings, boundaries)) = tags::implied_siblings(name) {
            let found = siblings
                .iter()
                .filter_map(|sibling| self.find_open(sibling, boundaries))
                .max();
            if let Some(index) = found {
                self.close_down_to(index, at);
            }
        }
    }

    /// Stack index of the nearest open `tag`, not looking past `boundaries`
    fn find_open(&self, tag: &str, boundaries: &[&str]) -> Option<usize> {
        for (index, open) in self.open.iter().enumerate().rev() {
            let open_tag = open.element.tag_name.as_str();
            if open_tag == tag {
                return Some(index);
            }
            if boundaries.contains(&open_tag) {
                return None;
            }
        }
        None
    }

    fn close_down_to(&mut self, index: usize, at: usize) {
        while self.open.len() > index {
            let Some(open) = self.open.pop() else { break };
            if self.open.len() > index && !tags::has_optional_end_tag(&open.element.tag_name) {
                self.issues.push(ParseIssue::unclosed(
                    open.element.tag_name.clone(),
                    Span::new(open.start, at),
                ));
            }
            self.close(open, at);
        }
    }

    fn close(&mut self, open: OpenElement, end: usize) {
        let mut element = open.element;
        element.span = Some(Span::new(open.start, end));
        self.current_children().push(Node::Element(element));
    }

    fn apply_attributes(&mut self, element: &mut Element, attributes: Vec<RawAttribute<'_>>) {
        for attribute in attributes {
            let name = attribute.name.to_ascii_lowercase();

            if name == ID_ATTRIBUTE {
                let value = attribute.value.map(decode_entities).unwrap_or_default();
                if element.id.is_some() {
                    self.issues
                        .push(ParseIssue::duplicate_attribute(name, attribute.span));
                } else if !value.is_empty() {
                    element.id = Some(NodeId::new(value.into_owned()));
                }
                continue;
            }

            if element.properties.contains(&name) {
                self.issues
                    .push(ParseIssue::duplicate_attribute(name, attribute.span));
                continue;
            }

            let value = property_value(&name, attribute.value);
            element.properties.insert(name, value);
        }
    }
}

/// Type an attribute value by its name
fn property_value(name: &str, raw: Option<&str>) -> PropertyValue {
    let Some(raw) = raw else {
        return PropertyValue::Boolean(true);
    };
    let value = decode_entities(raw);

    if tags::is_token_list_attribute(name) {
        return PropertyValue::Tokens(value.split_whitespace().map(str::to_string).collect());
    }

    if tags::is_numeric_attribute(name) {
        if let Ok(number) = value.trim().parse::<f64>() {
            if number.is_finite() {
                return PropertyValue::Number(number);
            }
        }
    }

    PropertyValue::String(value.into_owned())
}
