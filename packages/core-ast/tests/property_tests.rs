//! Property-based tests for the tree engine.
//!
//! Fragments are generated as trees and serialized, so every input is
//! well-formed markup. Checked:
//! 1. Round trip: parse(serialize(parse(html))) == parse(html)
//! 2. Normalization reaches its fixpoint in one pass
//! 3. Identity assignment yields unique identities and is stable
//! 4. Line/column mapping inverts offset mapping
//! 5. The parser accepts any input

use htmled_core_ast::{
    assign_identities, line_column_to_offset, normalize, offset_to_line_column, parse,
    serialize, visitor::elements, Element, IdGenerator, Node, PropertyValue, Root,
    SerializeOptions,
};
use proptest::prelude::*;
use std::collections::HashSet;

const TAGS: &[&str] = &["div", "section", "article", "em", "b", "i", "span", "ul", "blockquote"];

fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 \n&<>\"';]{0,12}").expect("valid regex")
}

fn attribute_strategy() -> impl Strategy<Value = (&'static str, PropertyValue)> {
    prop_oneof![
        text_strategy().prop_map(|value| ("title", PropertyValue::String(value))),
        prop::collection::vec("[a-z]{1,5}", 1..3)
            .prop_map(|tokens| ("class", PropertyValue::Tokens(tokens))),
        (1u32..20).prop_map(|n| ("colspan", PropertyValue::Number(f64::from(n)))),
        Just(("hidden", PropertyValue::Boolean(true))),
    ]
}

fn node_strategy() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        3 => text_strategy().prop_map(Node::text),
        1 => "[a-z ]{0,8}".prop_map(Node::comment),
    ];

    leaf.prop_recursive(4, 48, 5, |inner| {
        (
            prop::sample::select(TAGS),
            prop::collection::vec(attribute_strategy(), 0..3),
            prop::collection::vec(inner, 0..5),
        )
            .prop_map(|(tag, attributes, children)| {
                let mut element = Element::new(tag);
                for (name, value) in attributes {
                    element.set_property(name, value);
                }
                element.children = children;
                Node::Element(element)
            })
    })
}

fn html_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(node_strategy(), 0..6)
        .prop_map(|children| {
            serialize(&Root::with_children(children), &SerializeOptions::default())
        })
}

proptest! {
    #[test]
    fn serialize_parse_round_trip(html in html_strategy()) {
        let first = parse(&html);
        let again = parse(&serialize(&first, &SerializeOptions::default()));

        prop_assert!(first.structurally_eq(&again), "html: {}", html);
    }

    #[test]
    fn normalize_is_idempotent(html in html_strategy()) {
        let mut once = parse(&html);
        normalize(&mut once);
        let mut twice = once.clone();
        normalize(&mut twice);

        prop_assert!(once.structurally_eq(&twice), "html: {}", html);
    }

    #[test]
    fn identities_are_unique_and_stable(html in html_strategy()) {
        let mut root = parse(&html);
        let mut ids = IdGenerator::new();
        assign_identities(&mut root, &mut ids);

        let all = elements(&root);
        let unique: HashSet<_> = all.iter().filter_map(|e| e.id.clone()).collect();
        prop_assert_eq!(unique.len(), all.len());

        let before = root.clone();
        prop_assert_eq!(assign_identities(&mut root, &mut ids), 0);
        prop_assert_eq!(root, before);
    }

    #[test]
    fn identities_survive_serialization(html in html_strategy()) {
        let mut root = parse(&html);
        assign_identities(&mut root, &mut IdGenerator::new());

        let mut reparsed = parse(&serialize(&root, &SerializeOptions::default()));
        prop_assert_eq!(assign_identities(&mut reparsed, &mut IdGenerator::new()), 0);
        prop_assert!(root.structurally_eq(&reparsed));
    }

    #[test]
    fn line_column_inverts_offset(
        text in "[a-zé\n\r\t ]{0,40}",
        pick in any::<prop::sample::Index>()
    ) {
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let offset = boundaries[pick.index(boundaries.len())];
        let position = offset_to_line_column(&text, offset);

        prop_assert_eq!(line_column_to_offset(&text, position.line, position.column), offset);
    }

    #[test]
    fn parser_accepts_anything(source in "[<>/!a-z=\"' \n&#;-]{0,80}") {
        let root = parse(&source);
        let _ = serialize(&root, &SerializeOptions::default());
    }

    #[test]
    fn parser_accepts_arbitrary_unicode(source in any::<String>()) {
        let mut root = parse(&source);
        assign_identities(&mut root, &mut IdGenerator::new());
        normalize(&mut root);
        let _ = serialize(&root, &SerializeOptions::default());
    }
}
