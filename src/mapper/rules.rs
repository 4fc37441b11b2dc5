/// One unit of the mapping table.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Emit a single target element.
    Field(FieldRule),
    /// Emit one wrapper element per node the source path matches.
    Collection(CollectionRule),
}

/// A field rule: one target element, with optional source value, attributes,
/// and nested rules.
///
/// A field with `children` is a pure wrapper — its `source`, `source_attrs`
/// and value formatting are ignored, matching the target schema's element
/// content model; `rescope` then narrows the scope its children see.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: String,
    pub prefix: Option<&'static str>,
    /// Path whose first match provides the element text and the node for
    /// source-derived attributes.
    pub source: Option<String>,
    /// Attribute names copied from the node at `source`, when present there.
    pub source_attrs: Vec<String>,
    /// Literal or path-derived attributes; these override `source_attrs`
    /// values on the same name.
    pub properties: Vec<(String, AttrSource)>,
    /// Path to the node the nested rules are scoped to.
    pub rescope: Option<String>,
    pub children: Option<RuleSet>,
}

/// A collection rule: one wrapper per source match, each item scoped to its
/// own matched node.
#[derive(Debug, Clone)]
pub struct CollectionRule {
    pub name: String,
    pub prefix: Option<&'static str>,
    pub source: String,
    pub items: RuleSet,
}

/// Where an attribute value comes from.
#[derive(Debug, Clone)]
pub enum AttrSource {
    /// A fixed value.
    Literal(String),
    /// A path evaluated against the field's scope (not the attribute's
    /// source node).
    Path(String),
}

/// An ordered, immutable sequence of rules; application order is emission
/// order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet(Vec<Rule>);

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self(rules)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Start a field rule.
pub fn element(name: &str) -> FieldRule {
    FieldRule {
        name: name.to_string(),
        prefix: None,
        source: None,
        source_attrs: Vec::new(),
        properties: Vec::new(),
        rescope: None,
        children: None,
    }
}

/// Start a collection rule over the nodes matched by `source`.
pub fn collection(name: &str, source: &str) -> CollectionRule {
    CollectionRule {
        name: name.to_string(),
        prefix: None,
        source: source.to_string(),
        items: RuleSet::default(),
    }
}

impl FieldRule {
    pub fn prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub fn source(mut self, path: &str) -> Self {
        self.source = Some(path.to_string());
        self
    }

    /// Copy an attribute from the source node when it carries one.
    pub fn attr(mut self, name: &str) -> Self {
        self.source_attrs.push(name.to_string());
        self
    }

    /// Set an attribute to a literal value.
    pub fn prop(mut self, name: &str, value: &str) -> Self {
        self.properties
            .push((name.to_string(), AttrSource::Literal(value.to_string())));
        self
    }

    /// Derive an attribute from a path evaluated in the field's scope.
    pub fn prop_path(mut self, name: &str, path: &str) -> Self {
        self.properties
            .push((name.to_string(), AttrSource::Path(path.to_string())));
        self
    }

    /// Narrow the scope the nested rules are applied under.
    pub fn rescope(mut self, path: &str) -> Self {
        self.rescope = Some(path.to_string());
        self
    }

    pub fn children(mut self, children: RuleSet) -> Self {
        self.children = Some(children);
        self
    }
}

impl CollectionRule {
    pub fn prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub fn items(mut self, items: RuleSet) -> Self {
        self.items = items;
        self
    }
}

impl From<FieldRule> for Rule {
    fn from(rule: FieldRule) -> Self {
        Rule::Field(rule)
    }
}

impl From<CollectionRule> for Rule {
    fn from(rule: CollectionRule) -> Self {
        Rule::Collection(rule)
    }
}
