//! End-to-end scenarios over the engine's public surface

use htmled_core_ast::{
    apply_patch, assign_identities, build_index, detect_changes, find_element, move_node,
    normalize, offset_to_line_column, parse, parse_with_issues, serialize, ChangeSignal,
    EditError, Element, IdGenerator, LineColumn, Node, ParseIssueKind, Root, SerializeOptions,
    MAX_NESTING_DEPTH,
};

fn prepared(source: &str) -> Root {
    let mut root = parse(source);
    assign_identities(&mut root, &mut IdGenerator::new());
    normalize(&mut root);
    root
}

fn child_ids(root: &Root, parent: &str) -> Vec<String> {
    find_element(root, parent)
        .map(|element| {
            element
                .children
                .iter()
                .filter_map(|child| child.id().map(|id| id.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_round_trip_of_document() {
    let html = r#"<header class="top"><h1>Title &amp; more</h1><nav><a href="/a?x=1&amp;y=2">A</a></nav></header>
<main><p>Para<br>line two</p><input type="checkbox" checked><!-- end --></main>"#;

    let first = parse(html);
    let output = serialize(&first, &SerializeOptions::default());
    let second = parse(&output);

    assert!(first.structurally_eq(&second));
    assert!(output.contains("<br />"));
    assert!(output.contains(r#"href="/a?x=1&amp;y=2""#));
}

#[test]
fn test_identities_survive_round_trip() {
    let root = prepared("<div><p>a</p><p>b</p></div>");
    let html = serialize(&root, &SerializeOptions::default());

    let mut reparsed = parse(&html);
    let assigned = assign_identities(&mut reparsed, &mut IdGenerator::new());

    assert_eq!(assigned, 0);
    assert!(root.structurally_eq(&reparsed));
}

#[test]
fn test_move_clamps_index() {
    let mut root = prepared("<ul><li>1</li><li>2</li><li>3</li></ul><p>moving</p>");
    assert_eq!(child_ids(&root, "node-1"), vec!["node-2", "node-3", "node-4"]);

    let at = move_node(&mut root, "node-5", Some("node-1"), 999).unwrap();

    assert_eq!(at, 3);
    assert_eq!(child_ids(&root, "node-1"), vec!["node-2", "node-3", "node-4", "node-5"]);
    assert_eq!(root.children.len(), 1);
}

#[test]
fn test_move_onto_descendant_leaves_tree() {
    let mut root = prepared("<section><div><p>deep</p></div></section>");
    let before = root.clone();

    let result = move_node(&mut root, "node-1", Some("node-3"), 0);

    assert!(matches!(result, Err(EditError::Cycle { .. })));
    assert_eq!(root, before);
}

#[test]
fn test_diff_signals() {
    let old = prepared("<div><p>One</p></div>");
    let new = prepared("<div><p>One</p><p>Two</p></div>");
    assert_eq!(detect_changes(&old, &new), Some(ChangeSignal::ReparseRequired));

    let edited = prepared("<div><p>Uno</p></div>");
    assert_eq!(detect_changes(&old, &edited), None);
}

#[test]
fn test_patch_missing_identity() {
    let mut root = prepared("<div><p>x</p></div>");
    let before = root.clone();

    let result = apply_patch(&mut root, "node-42", Element::new("p"));

    assert_eq!(result, Err(EditError::NotFound("node-42".into())));
    assert_eq!(root, before);
}

#[test]
fn test_patch_keeps_siblings_and_identities() {
    let mut root = prepared("<ul><li>a</li><li>b</li><li>c</li></ul>");
    let replacement = Element::new("li").with_id("node-3").with_child(Node::text("B"));

    apply_patch(&mut root, "node-3", replacement).unwrap();

    assert_eq!(
        serialize(&root, &SerializeOptions::default()),
        r#"<ul data-id="node-1"><li data-id="node-2">a</li><li data-id="node-3">B</li><li data-id="node-4">c</li></ul>"#
    );
}

#[test]
fn test_index_maps_cursor_to_node() {
    let source = "<div>\n  <p>hello</p>\n</div>";
    let mut root = parse(source);
    assign_identities(&mut root, &mut IdGenerator::new());
    let index = build_index(&root);

    let p = index.range("node-2").unwrap();
    assert_eq!(offset_to_line_column(source, p.start), LineColumn::new(2, 3));
    assert_eq!(index.element_at_offset(p.start + 4).map(|id| id.as_str()), Some("node-2"));
}

#[test]
fn test_malformed_markup_still_yields_tree() {
    let output = parse_with_issues("<div><p>unclosed <b>bold</div></span><!-- open");

    assert_eq!(output.root.children.len(), 2);
    assert!(output
        .issues
        .iter()
        .any(|issue| issue.kind == ParseIssueKind::StrayEndTag("span".into())));
    assert!(output
        .issues
        .iter()
        .any(|issue| issue.kind == ParseIssueKind::EofInComment));
}

#[test]
fn test_round_trip_past_nesting_cap() {
    let depth = MAX_NESTING_DEPTH + 88;
    let html = "<div>".repeat(depth) + "x" + &"</div>".repeat(depth) + "<p>tail</p>";

    let first = parse(&html);
    let again = parse(&serialize(&first, &SerializeOptions::default()));

    assert_eq!(first.children.len(), 2);
    assert!(first.structurally_eq(&again));
}

#[test]
fn test_round_trip_of_svg_and_empty_comments() {
    let html = r#"<svg viewBox="0 0 2 2"><circle r="1"/><rect/></svg><!---><p>x</p><!-->"#;

    let first = parse(html);
    let again = parse(&serialize(&first, &SerializeOptions::default()));

    assert_eq!(first.children.len(), 4);
    assert_eq!(first.children[0].children().len(), 2);
    assert!(first.structurally_eq(&again));
}
