//! Conversion orchestration: parse, build, prune, serialize.

use crate::error::ConvertError;
use crate::mapper::{self, cii};
use crate::xml::{Document, Element, Scope, write_document};
use crate::{PREFIX_RSM, SOURCE_BINDINGS, TARGET_DECLARATIONS};

/// Elements the pruner keeps even when empty; the target schema requires
/// them to be present.
pub const REQUIRED_ELEMENTS: &[&str] = &["ExchangedDocumentContext"];

/// Convert a UBL invoice document into CII XML.
///
/// The whole conversion is a pure function of the input text: the source
/// tree is never mutated, no state survives the call, and independent
/// conversions can run concurrently. Only unparseable input fails; every
/// missing or malformed field degrades to an absent element and the
/// conversion completes.
///
/// # Errors
///
/// [`ConvertError::Parse`] or [`ConvertError::EmptyDocument`] when the input
/// cannot be parsed into a non-empty tree, [`ConvertError::Write`] when
/// serialization fails.
pub fn convert(ubl_xml: &str) -> Result<String, ConvertError> {
    let document = Document::parse(ubl_xml)?;
    let root = document.root.as_ref().ok_or(ConvertError::EmptyDocument)?;

    let mut out = Element::with_prefix(PREFIX_RSM, "CrossIndustryInvoice");
    for (prefix, uri) in TARGET_DECLARATIONS {
        out.set_attr(&format!("xmlns:{prefix}"), uri);
    }

    let scope = Scope::new(root, SOURCE_BINDINGS);
    mapper::apply(cii::rules(), &scope, &mut out, None);
    prune_empty(&mut out, REQUIRED_ELEMENTS);
    write_document(&out)
}

/// Remove descendants of `element` that carry no attributes, no non-blank
/// text, and no surviving children, unless their name is in `required`.
///
/// Children are pruned before their parent is judged, so a wrapper whose
/// only content was itself pruned collapses in the same pass; the result is
/// a fixed point and running the pass again changes nothing.
pub fn prune_empty(element: &mut Element, required: &[&str]) {
    element.children.retain_mut(|child| {
        prune_empty(child, required);
        !prunable(child, required)
    });
}

fn prunable(element: &Element, required: &[&str]) -> bool {
    if required.contains(&element.name.as_str()) {
        return false;
    }
    element.attributes.is_empty()
        && element.children.is_empty()
        && element
            .text
            .as_deref()
            .is_none_or(|text| text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(xml: &str) -> Element {
        Document::parse(xml).unwrap().root.unwrap()
    }

    #[test]
    fn prunes_cascading_empty_wrappers_in_one_pass() {
        let mut root = tree("<root><a><b><c/></b></a><keep>x</keep></root>");
        prune_empty(&mut root, &[]);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "keep");
    }

    #[test]
    fn keeps_elements_with_attributes_or_text() {
        let mut root = tree(r#"<root><a id="1"/><b>t</b><c/></root>"#);
        prune_empty(&mut root, &[]);
        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn whitespace_only_text_counts_as_empty() {
        let mut root = Element::new("root");
        let mut child = Element::new("blank");
        child.set_text("   ");
        root.add_child(child);
        prune_empty(&mut root, &[]);
        assert!(root.children.is_empty());
    }

    #[test]
    fn required_elements_survive_and_anchor_their_ancestors() {
        let mut root = tree("<root><wrap><ExchangedDocumentContext/></wrap></root>");
        prune_empty(&mut root, REQUIRED_ELEMENTS);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].children[0].name, "ExchangedDocumentContext");
    }

    #[test]
    fn pruning_is_idempotent() {
        let mut once = tree(r#"<root><a><b/></a><c d="1"><e/></c><ExchangedDocumentContext/></root>"#);
        prune_empty(&mut once, REQUIRED_ELEMENTS);
        let mut twice = once.clone();
        prune_empty(&mut twice, REQUIRED_ELEMENTS);
        assert_eq!(once, twice);
    }
}
