use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::ConvertError;

/// One element of an owned XML tree.
///
/// `ns` holds the resolved namespace URI of a parsed source element; built
/// output elements carry only `prefix`, which is what serialization uses.
/// Attribute order is preserved, and `xmlns` declarations are consumed into
/// the namespace context during parsing rather than kept as attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Namespace prefix as written (source) or as assigned (output).
    pub prefix: Option<String>,
    /// Local element name.
    pub name: String,
    /// Resolved namespace URI, filled in during parsing.
    pub ns: Option<String>,
    /// Ordered attributes, excluding namespace declarations.
    pub attributes: Vec<(String, String)>,
    /// Accumulated text content of this element itself.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Create an element with no prefix.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            name: name.into(),
            ns: None,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Create an element carrying a namespace prefix for serialization.
    pub fn with_prefix(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::new(name)
        }
    }

    /// The name as serialized, `prefix:name` or bare `name`.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Look up an attribute value by its name as written.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value under the same name.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Replace the text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    fn append_text(&mut self, chunk: &str) {
        match &mut self.text {
            Some(text) => text.push_str(chunk),
            None => self.text = Some(chunk.to_string()),
        }
    }

    /// Append a child element.
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

/// Namespace declarations introduced by a single element.
#[derive(Debug, Default)]
struct NsDecls {
    /// `xmlns="..."`; an empty URI un-declares the default namespace.
    default: Option<String>,
    /// `xmlns:p="..."` pairs.
    prefixes: Vec<(String, String)>,
}

/// A parsed XML document.
#[derive(Debug)]
pub struct Document {
    /// Root element, if the input yielded one.
    pub root: Option<Element>,
}

impl Document {
    /// Parse an XML document, resolving each element's namespace URI from
    /// the declarations in scope at its depth.
    pub fn parse(xml: &str) -> Result<Self, ConvertError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut root = None;
        let mut element_stack: Vec<Element> = Vec::new();
        let mut ns_stack: Vec<NsDecls> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let (mut element, decls) = element_from_start(e)?;
                    ns_stack.push(decls);
                    element.ns = resolve_ns(&ns_stack, element.prefix.as_deref());
                    element_stack.push(element);
                }
                Ok(Event::Empty(ref e)) => {
                    let (mut element, decls) = element_from_start(e)?;
                    ns_stack.push(decls);
                    element.ns = resolve_ns(&ns_stack, element.prefix.as_deref());
                    ns_stack.pop();
                    attach(element, &mut element_stack, &mut root);
                }
                Ok(Event::End(_)) => {
                    ns_stack.pop();
                    if let Some(element) = element_stack.pop() {
                        attach(element, &mut element_stack, &mut root);
                    }
                }
                Ok(Event::Text(ref e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| ConvertError::Parse(format!("bad text content: {e}")))?;
                    if let Some(current) = element_stack.last_mut() {
                        current.append_text(&text);
                    }
                }
                Ok(Event::CData(ref e)) => {
                    let text = std::str::from_utf8(e)
                        .map_err(|e| ConvertError::Parse(format!("bad CDATA content: {e}")))?;
                    if let Some(current) = element_stack.last_mut() {
                        current.append_text(text);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(ConvertError::Parse(format!(
                        "parse error at position {}: {e}",
                        reader.buffer_position()
                    )));
                }
            }
        }

        // Recover from unclosed elements rather than discarding the tree.
        while let Some(element) = element_stack.pop() {
            attach(element, &mut element_stack, &mut root);
        }

        Ok(Self { root })
    }
}

fn attach(element: Element, stack: &mut Vec<Element>, root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.add_child(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Build an element from a start tag, splitting off namespace declarations.
fn element_from_start(e: &BytesStart<'_>) -> Result<(Element, NsDecls), ConvertError> {
    let qname = e.name();
    let raw_name = std::str::from_utf8(qname.as_ref())
        .map_err(|e| ConvertError::Parse(format!("bad element name: {e}")))?;
    let mut element = match raw_name.split_once(':') {
        Some((prefix, local)) => Element::with_prefix(prefix, local),
        None => Element::new(raw_name),
    };

    let mut decls = NsDecls::default();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ConvertError::Parse(format!("bad attribute: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| ConvertError::Parse(format!("bad attribute name: {e}")))?;
        let value = attr
            .unescape_value()
            .map_err(|e| ConvertError::Parse(format!("bad attribute value: {e}")))?
            .into_owned();

        if key == "xmlns" {
            decls.default = Some(value);
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            decls.prefixes.push((prefix.to_string(), value));
        } else {
            element.attributes.push((key.to_string(), value));
        }
    }

    Ok((element, decls))
}

/// Resolve a prefix (or the default namespace) against the declaration
/// stack, innermost scope first.
fn resolve_ns(stack: &[NsDecls], prefix: Option<&str>) -> Option<String> {
    match prefix {
        Some(prefix) => stack.iter().rev().find_map(|decls| {
            decls
                .prefixes
                .iter()
                .rev()
                .find(|(p, _)| p == prefix)
                .map(|(_, uri)| uri.clone())
        }),
        None => stack
            .iter()
            .rev()
            .find_map(|decls| decls.default.clone())
            .filter(|uri| !uri.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_document() {
        let doc = Document::parse("<root><child>text</child></root>").unwrap();
        let root = doc.root.unwrap();
        assert_eq!(root.name, "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].text.as_deref(), Some("text"));
    }

    #[test]
    fn resolves_default_and_prefixed_namespaces() {
        let doc = Document::parse(
            r#"<Invoice xmlns="urn:ubl" xmlns:cbc="urn:cbc"><cbc:ID>1</cbc:ID><Line/></Invoice>"#,
        )
        .unwrap();
        let root = doc.root.unwrap();
        assert_eq!(root.ns.as_deref(), Some("urn:ubl"));
        assert_eq!(root.children[0].ns.as_deref(), Some("urn:cbc"));
        assert_eq!(root.children[0].prefix.as_deref(), Some("cbc"));
        // Unprefixed child inherits the default namespace.
        assert_eq!(root.children[1].ns.as_deref(), Some("urn:ubl"));
    }

    #[test]
    fn inner_declarations_shadow_outer_ones() {
        let doc = Document::parse(
            r#"<a xmlns:p="urn:outer"><b xmlns:p="urn:inner"><p:c/></b><p:d/></a>"#,
        )
        .unwrap();
        let root = doc.root.unwrap();
        assert_eq!(root.children[0].children[0].ns.as_deref(), Some("urn:inner"));
        assert_eq!(root.children[1].ns.as_deref(), Some("urn:outer"));
    }

    #[test]
    fn namespace_declarations_are_not_attributes() {
        let doc =
            Document::parse(r#"<a xmlns="urn:x" xmlns:y="urn:y" id="7"/>"#).unwrap();
        let root = doc.root.unwrap();
        assert_eq!(root.attributes, vec![("id".to_string(), "7".to_string())]);
    }

    #[test]
    fn empty_input_has_no_root() {
        assert!(Document::parse("").unwrap().root.is_none());
        assert!(Document::parse("   \n").unwrap().root.is_none());
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let doc = Document::parse("<a>x<b>y</b></a>").unwrap();
        assert_eq!(doc.root.unwrap().text_content(), "xy");
    }

    #[test]
    fn set_attr_replaces_existing_value() {
        let mut el = Element::new("e");
        el.set_attr("schemeID", "first");
        el.set_attr("schemeID", "second");
        assert_eq!(el.attr("schemeID"), Some("second"));
        assert_eq!(el.attributes.len(), 1);
    }
}
