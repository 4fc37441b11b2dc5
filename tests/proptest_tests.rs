//! Property-based tests for the empty-element pruning pass.

use proptest::prelude::*;

use ubl2cii::xml::Element;
use ubl2cii::{REQUIRED_ELEMENTS, prune_empty};

/// Arbitrary element trees mixing empty and non-empty leaves, attribute
/// carriers, and the structurally-required wrapper name.
fn arb_tree() -> impl Strategy<Value = Element> {
    let leaf = (
        prop::sample::select(vec!["Amount", "ID", "Note", "ExchangedDocumentContext"]),
        prop::option::of(prop::sample::select(vec!["", "   ", "text", "380"])),
        any::<bool>(),
    )
        .prop_map(|(name, text, has_attr)| {
            let mut element = Element::new(name);
            if let Some(text) = text {
                element.set_text(text);
            }
            if has_attr {
                element.set_attr("schemeID", "X");
            }
            element
        });

    leaf.prop_recursive(4, 64, 5, |inner| {
        (
            prop::sample::select(vec!["Wrapper", "Settlement", "ExchangedDocumentContext"]),
            prop::collection::vec(inner, 0..5),
        )
            .prop_map(|(name, children)| {
                let mut element = Element::new(name);
                for child in children {
                    element.add_child(child);
                }
                element
            })
    })
}

/// True when no descendant is still removable by the pruner's rules.
fn fully_pruned(element: &Element) -> bool {
    element.children.iter().all(|child| {
        let keep = !child.attributes.is_empty()
            || child
                .text
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty())
            || !child.children.is_empty()
            || REQUIRED_ELEMENTS.contains(&child.name.as_str());
        keep && fully_pruned(child)
    })
}

proptest! {
    #[test]
    fn pruning_is_idempotent(mut tree in arb_tree()) {
        prune_empty(&mut tree, REQUIRED_ELEMENTS);
        let once = tree.clone();
        prune_empty(&mut tree, REQUIRED_ELEMENTS);
        prop_assert_eq!(once, tree);
    }

    #[test]
    fn pruning_reaches_a_fixed_point_in_one_pass(mut tree in arb_tree()) {
        prune_empty(&mut tree, REQUIRED_ELEMENTS);
        prop_assert!(fully_pruned(&tree));
    }

    #[test]
    fn pruning_never_removes_required_elements(mut tree in arb_tree()) {
        let before = count_required(&tree);
        prune_empty(&mut tree, REQUIRED_ELEMENTS);
        prop_assert_eq!(count_required(&tree), before);
    }
}

fn count_required(element: &Element) -> usize {
    element
        .children
        .iter()
        .map(count_required)
        .sum::<usize>()
        + usize::from(REQUIRED_ELEMENTS.contains(&element.name.as_str()))
}
