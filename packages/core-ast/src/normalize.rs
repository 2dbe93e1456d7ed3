use crate::ast::{Element, Node, Root, ID_ATTRIBUTE};
use crate::tags;
use std::mem;
use tracing::{debug, instrument};

/// Rewrite the tree into canonical form:
///
/// 1. drop whitespace-only text,
/// 2. merge adjacent text siblings,
/// 3. unwrap `span`s that carry nothing but an identity,
/// 4. trim the first and last text child of block elements.
///
/// A single pass reaches the fixpoint; running it again changes nothing.
#[instrument(skip_all)]
pub fn normalize(root: &mut Root) {
    let mut stats = Stats::default();
    let mut top = Level::new(mem::take(&mut root.children));
    let mut open: Vec<(Element, Level)> = Vec::new();

    loop {
        let level = match open.last_mut() {
            Some((_, level)) => level,
            None => &mut top,
        };

        match level.pending.next() {
            Some(Node::Element(mut element)) => {
                let children = mem::take(&mut element.children);
                open.push((element, Level::new(children)));
            }
            Some(Node::Text(text)) => {
                if is_blank(&text.value) {
                    stats.removed += 1;
                } else {
                    level.done.push(Node::Text(text));
                }
            }
            Some(comment) => level.done.push(comment),
            None => {
                let Some((mut element, finished)) = open.pop() else {
                    break;
                };
                element.children =
                    finish_children(Some(&element.tag_name), finished.done, &mut stats);

                let parent = match open.last_mut() {
                    Some((_, level)) => &mut level.done,
                    None => &mut top.done,
                };
                if is_redundant_wrapper(&element) {
                    stats.unwrapped += 1;
                    parent.append(&mut element.children);
                } else {
                    parent.push(Node::Element(element));
                }
            }
        }
    }

    root.children = finish_children(None, top.done, &mut stats);
    debug!(
        removed = stats.removed,
        merged = stats.merged,
        unwrapped = stats.unwrapped,
        "normalized tree"
    );
}

#[derive(Default)]
struct Stats {
    removed: usize,
    merged: usize,
    unwrapped: usize,
}

/// Children of one element: the ones still to visit and the rebuilt ones
struct Level {
    pending: std::vec::IntoIter<Node>,
    done: Vec<Node>,
}

impl Level {
    fn new(children: Vec<Node>) -> Self {
        Self {
            done: Vec::with_capacity(children.len()),
            pending: children.into_iter(),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.chars().all(char::is_whitespace)
}

fn is_redundant_wrapper(element: &Element) -> bool {
    tags::is_inline_wrapper(&element.tag_name)
        && element.properties.iter().all(|(name, _)| name == ID_ATTRIBUTE)
}

/// Merge text runs (hoisted wrapper content included), then trim for blocks
fn finish_children(tag: Option<&str>, children: Vec<Node>, stats: &mut Stats) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(children.len());

    for node in children {
        match node {
            Node::Text(text) if is_blank(&text.value) => stats.removed += 1,
            Node::Text(text) => match merged.last_mut() {
                Some(Node::Text(previous)) => {
                    previous.value.push_str(&text.value);
                    previous.span = match (previous.span, text.span) {
                        (Some(a), Some(b)) => Some(a.join(b)),
                        (a, b) => a.or(b),
                    };
                    stats.merged += 1;
                }
                _ => merged.push(Node::Text(text)),
            },
            node => merged.push(node),
        }
    }

    if tag.is_some_and(tags::is_block) {
        if let Some(Node::Text(first)) = merged.first_mut() {
            let cut = first.value.len() - first.value.trim_start().len();
            first.value.drain(..cut);
        }
        if let Some(Node::Text(last)) = merged.last_mut() {
            let keep = last.value.trim_end().len();
            last.value.truncate(keep);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::serializer::{serialize, SerializeOptions};

    fn normalized(source: &str) -> String {
        let mut root = parse(source);
        normalize(&mut root);
        serialize(&root, &SerializeOptions::default())
    }

    #[test]
    fn test_removes_whitespace_text() {
        assert_eq!(
            normalized("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>"),
            "<ul><li>a</li><li>b</li></ul>"
        );
    }

    #[test]
    fn test_unwraps_bare_span_and_merges_text() {
        assert_eq!(normalized("<em>a<span>b</span>c</em>"), "<em>abc</em>");
    }

    #[test]
    fn test_keeps_span_with_attributes() {
        assert_eq!(
            normalized(r#"<em>a<span class="x">b</span>c</em>"#),
            r#"<em>a<span class="x">b</span>c</em>"#
        );
    }

    #[test]
    fn test_span_with_only_identity_is_unwrapped() {
        assert_eq!(
            normalized(r#"<p data-id="p"><span data-id="s">x</span></p>"#),
            r#"<p data-id="p">x</p>"#
        );
    }

    #[test]
    fn test_nested_wrappers_unwrap_fully() {
        assert_eq!(normalized("<p><span><span>a</span> b</span></p>"), "<p>a b</p>");
    }

    #[test]
    fn test_trims_block_edges_only() {
        assert_eq!(
            normalized("<div>  hello <b> x </b>  world  </div>"),
            "<div>hello <b> x </b>  world</div>"
        );
        assert_eq!(normalized("<em> a </em>"), "<em> a </em>");
    }

    #[test]
    fn test_trim_sees_hoisted_text() {
        assert_eq!(normalized("<p><span>  hi</span></p>"), "<p>hi</p>");
    }

    #[test]
    fn test_comments_are_kept() {
        assert_eq!(normalized("<div> <!-- c --> </div>"), "<div><!-- c --></div>");
    }

    #[test]
    fn test_top_level_whitespace_removed() {
        assert_eq!(normalized("\n<p>a</p>\n\n<p>b</p>\n"), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_second_pass_is_identity() {
        let mut once =
            parse("<div>\n <span> a </span><span>b</span> <p> c <span>d</span></p></div>");
        normalize(&mut once);
        let mut twice = once.clone();
        normalize(&mut twice);

        assert!(once.structurally_eq(&twice));
    }
}
