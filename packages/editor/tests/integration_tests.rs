//! Integration tests for editor crate

use anyhow::Result;
use htmled_core_ast::get_document_id;
use htmled_editor::{Applied, ChangeSignal, Document, EditorError, Mutation, MutationError};
use std::fs;
use tempfile::TempDir;

const PAGE: &str = "<main>\n  <h1>Title</h1>\n  <ul><li>one</li><li>two</li></ul>\n</main>\n";

#[test]
fn test_document_lifecycle() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("index.html");
    fs::write(&path, PAGE)?;

    let mut doc = Document::load(&path)?;
    let prefix = get_document_id(&path.to_string_lossy());
    let heading = format!("{}-2", prefix);
    let list = format!("{}-3", prefix);

    // Check initial state
    assert_eq!(doc.version, 0);
    assert!(!doc.is_dirty());
    assert_eq!(doc.path(), Some(path.as_path()));
    assert_eq!(doc.element(&heading).map(|e| e.tag_name.as_str()), Some("h1"));

    doc.apply(Mutation::MoveNode {
        node_id: heading.as_str().into(),
        new_parent_id: Some(list.as_str().into()),
        index: 0,
    })?;
    assert_eq!(doc.version, 1);
    assert!(doc.is_dirty());

    doc.save()?;
    assert!(!doc.is_dirty());

    let saved = fs::read_to_string(&path)?;
    assert_eq!(saved, doc.source());
    let moved = format!(r#"<ul data-id="{}"><h1 data-id="{}">Title</h1>"#, list, heading);
    assert!(saved.contains(&moved));

    // Reloading keeps every identity written to disk
    let reloaded = Document::load(&path)?;
    let mut before: Vec<_> = doc.index().ids().map(|id| id.to_string()).collect();
    let mut after: Vec<_> = reloaded.index().ids().map(|id| id.to_string()).collect();
    before.sort();
    after.sort();
    assert_eq!(before, after);

    Ok(())
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = Document::load(dir.path().join("missing.html"));

    assert!(matches!(result, Err(EditorError::Io(_))));
}

#[test]
fn test_json_mutations() -> Result<()> {
    let mut doc = Document::from_source(PAGE);

    let result = doc.apply_json(
        r#"{"type":"replaceNode","nodeId":"node-2","element":{"tagName":"h2","properties":[],"children":[{"type":"text","value":"Subtitle"}]}}"#,
    )?;

    assert_eq!(result.version, 1);
    assert!(matches!(
        result.applied,
        Applied::Replaced { ref previous } if previous.tag_name == "h1"
    ));
    assert!(doc.source().contains(r#"<h2 data-id="node-2">Subtitle</h2>"#));

    let bad =
        doc.apply_json(r#"{"type":"moveNode","nodeId":"node-9","newParentId":null,"index":0}"#);
    assert!(matches!(
        bad,
        Err(EditorError::Mutation(MutationError::NodeNotFound(ref id))) if id == "node-9"
    ));

    let malformed = doc.apply_json(r#"{"type":"explode"}"#);
    assert!(matches!(malformed, Err(EditorError::Json(_))));
    assert_eq!(doc.version, 1);

    Ok(())
}

#[test]
fn test_move_to_root_end() -> Result<()> {
    let mut doc = Document::from_source("<div><p>a</p></div><footer></footer>");

    let result = doc.apply(Mutation::MoveNode {
        node_id: "node-2".into(),
        new_parent_id: None,
        index: 100,
    })?;

    assert_eq!(result.applied, Applied::Moved { index: 2 });
    assert_eq!(
        doc.source(),
        r#"<div data-id="node-1"></div><footer data-id="node-3"></footer><p data-id="node-2">a</p>"#
    );
    Ok(())
}

#[test]
fn test_selection_after_structural_edit() -> Result<()> {
    let mut doc = Document::from_source(PAGE);
    doc.select(Some("node-5"))?;
    let before = doc.selected_range().unwrap();

    doc.apply(Mutation::MoveNode {
        node_id: "node-5".into(),
        new_parent_id: Some("node-3".into()),
        index: 0,
    })?;

    // Selection keeps the node; its range follows the regenerated source
    assert_eq!(doc.selected().map(|id| id.as_str()), Some("node-5"));
    let after = doc.selected_range().unwrap();
    assert_ne!(before, after);

    let span = doc.index().range("node-5").unwrap();
    assert_eq!(&doc.source()[span.start..span.end], r#"<li data-id="node-5">two</li>"#);
    assert_eq!(doc.node_at_offset(span.start + 1).map(|id| id.as_str()), Some("node-5"));
    Ok(())
}

#[test]
fn test_code_edits_round_trip_with_canvas_edits() -> Result<()> {
    let mut doc = Document::from_source("<section><p>x</p></section>");

    doc.apply(Mutation::ReplaceNode {
        node_id: "node-2".into(),
        element: htmled_editor::Element::new("p").with_child(htmled_editor::Node::text("y")),
    })?;

    // Typing in the regenerated source keeps identities
    let edited = doc.source().replace(">y<", ">z<");
    assert_eq!(doc.update_source(edited), None);
    assert_eq!(doc.element("node-2").and_then(|e| e.children[0].as_text()), Some("z"));

    let grown = doc.source().replace("</section>", "<p>new</p></section>");
    assert_eq!(doc.update_source(grown), Some(ChangeSignal::ReparseRequired));
    assert_eq!(doc.index().len(), 3);
    assert_eq!(doc.version, 3);
    Ok(())
}
