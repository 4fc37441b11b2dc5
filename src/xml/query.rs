use super::tree::Element;

/// A source node paired with the document root and the fixed prefix→URI
/// binding table, against which mapping paths are evaluated.
///
/// Re-scoping never copies or mutates the tree; a scope only narrows where
/// relative queries look. A dead scope (`node` of `None`) is the result of a
/// re-scope path that matched nothing: every query on it yields no match,
/// so nested rules still run but emit empty elements.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    root: &'a Element,
    node: Option<&'a Element>,
    bindings: &'a [(&'a str, &'a str)],
}

/// One step of a parsed path.
struct Step<'p> {
    prefix: Option<&'p str>,
    name: &'p str,
    /// Reached via `//` — match at any depth below the context node.
    descendant: bool,
}

impl<'a> Scope<'a> {
    /// Scope over a whole document.
    pub fn new(root: &'a Element, bindings: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            root,
            node: Some(root),
            bindings,
        }
    }

    /// Narrow to `node`, keeping the document root and bindings.
    pub fn rescope(&self, node: Option<&'a Element>) -> Self {
        Self { node, ..*self }
    }

    /// The current context node, absent for dead scopes.
    pub fn node(&self) -> Option<&'a Element> {
        self.node
    }

    /// First match in document order.
    pub fn first(&self, path: &str) -> Option<&'a Element> {
        self.all(path).into_iter().next()
    }

    /// Text content of the first match. `None` means no match; a matched
    /// but empty element yields an empty string.
    pub fn text(&self, path: &str) -> Option<String> {
        self.first(path).map(Element::text_content)
    }

    /// An attribute of the first match.
    pub fn attr(&self, path: &str, name: &str) -> Option<&'a str> {
        self.first(path)?.attr(name)
    }

    /// All matches in document order.
    ///
    /// A path starting with `//` queries from the document root regardless
    /// of the current scope; anything else is relative to the context node.
    /// Steps are `prefix:local` names joined by `/` (child) or `//`
    /// (descendant); prefixes resolve through the binding table, never
    /// through the prefixes the document itself declares. No match is the
    /// normal outcome, never an error.
    pub fn all(&self, path: &str) -> Vec<&'a Element> {
        let (absolute, steps) = parse_path(path);
        if steps.is_empty() || self.node.is_none() {
            return Vec::new();
        }
        let start = if absolute { self.root } else { self.node.unwrap_or(self.root) };

        let mut current = vec![start];
        for (index, step) in steps.iter().enumerate() {
            let uri = match step.prefix {
                Some(prefix) => match self.lookup(prefix) {
                    Some(uri) => Some(uri),
                    // Unknown prefix: nothing can match.
                    None => return Vec::new(),
                },
                None => None,
            };

            let mut next = Vec::new();
            for node in current {
                if absolute && index == 0 {
                    // Descendant-or-self from the document root.
                    collect_matching(node, step, uri, &mut next);
                } else if step.descendant {
                    for child in &node.children {
                        collect_matching(child, step, uri, &mut next);
                    }
                } else {
                    for child in &node.children {
                        if matches(child, step, uri) {
                            next.push(child);
                        }
                    }
                }
            }
            if step.descendant {
                // When `current` held nested nodes, their subtree walks
                // overlap; keep the first occurrence of each match.
                let mut seen: Vec<*const Element> = Vec::new();
                next.retain(|el| {
                    let ptr: *const Element = *el;
                    if seen.contains(&ptr) {
                        false
                    } else {
                        seen.push(ptr);
                        true
                    }
                });
            }
            current = next;
        }
        current
    }

    fn lookup(&self, prefix: &str) -> Option<&'a str> {
        self.bindings
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, uri)| *uri)
    }
}

fn matches(el: &Element, step: &Step<'_>, uri: Option<&str>) -> bool {
    el.name == step.name && (uri.is_none() || el.ns.as_deref() == uri)
}

/// Pre-order walk collecting `el` and all its descendants that match.
fn collect_matching<'a>(
    el: &'a Element,
    step: &Step<'_>,
    uri: Option<&str>,
    out: &mut Vec<&'a Element>,
) {
    if matches(el, step, uri) {
        out.push(el);
    }
    for child in &el.children {
        collect_matching(child, step, uri, out);
    }
}

fn parse_path(path: &str) -> (bool, Vec<Step<'_>>) {
    let (absolute, rest) = match path.strip_prefix("//") {
        Some(rest) => (true, rest),
        None => (false, path),
    };

    let mut steps = Vec::new();
    let mut descendant = false;
    for segment in rest.split('/') {
        if segment.is_empty() {
            // An empty segment is the gap inside `//`.
            descendant = true;
            continue;
        }
        let (prefix, name) = match segment.split_once(':') {
            Some((prefix, name)) => (Some(prefix), name),
            None => (None, segment),
        };
        steps.push(Step {
            prefix,
            name,
            descendant,
        });
        descendant = false;
    }
    (absolute, steps)
}
