use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::{AttrSource, CollectionRule, FieldRule, Rule, RuleSet};
use crate::PREFIX_RAM;
use crate::xml::{Element, Scope};

/// Apply a rule set against `scope`, appending the emitted elements to
/// `out` in rule order.
///
/// `inherited` is the nearest enclosing explicit prefix; a rule without a
/// prefix of its own adopts it, falling back to `ram` at the top level.
/// Every per-field resolution failure degrades to an absent value — the
/// element is still emitted and left for the pruner.
pub fn apply(
    rules: &RuleSet,
    scope: &Scope<'_>,
    out: &mut Element,
    inherited: Option<&'static str>,
) {
    for rule in rules {
        match rule {
            Rule::Field(field) => apply_field(field, scope, out, inherited),
            Rule::Collection(coll) => apply_collection(coll, scope, out, inherited),
        }
    }
}

fn apply_field(
    field: &FieldRule,
    scope: &Scope<'_>,
    out: &mut Element,
    inherited: Option<&'static str>,
) {
    let prefix = field.prefix.or(inherited).unwrap_or(PREFIX_RAM);
    let mut element = Element::with_prefix(prefix, &field.name);

    if let Some(children) = &field.children {
        // A rescope path that matches nothing gives a dead scope: the
        // children are still emitted, empty, and pruned afterwards.
        let sub = match &field.rescope {
            Some(path) => scope.rescope(scope.first(path)),
            None => *scope,
        };
        apply(children, &sub, &mut element, Some(prefix));
    } else {
        let mut value = field.source.as_deref().and_then(|path| scope.text(path));
        if let Some(format) = formatter_for(&field.name) {
            value = value.as_deref().and_then(format);
            if value.is_none() {
                // A formatted field with nothing to format stays bare —
                // no attributes — so the pruner can remove it.
                out.add_child(element);
                return;
            }
        }

        for name in &field.source_attrs {
            let found = field
                .source
                .as_deref()
                .and_then(|path| scope.attr(path, name));
            if let Some(v) = found {
                element.set_attr(name, v);
            }
        }
        for (name, attr_source) in &field.properties {
            match attr_source {
                AttrSource::Literal(v) => element.set_attr(name, v),
                AttrSource::Path(path) => {
                    if let Some(v) = scope.text(path) {
                        element.set_attr(name, &v);
                    }
                }
            }
        }

        if let Some(v) = value.filter(|v| !v.is_empty()) {
            element.set_text(v);
        }
    }

    out.add_child(element);
}

fn apply_collection(
    coll: &CollectionRule,
    scope: &Scope<'_>,
    out: &mut Element,
    inherited: Option<&'static str>,
) {
    let prefix = coll.prefix.or(inherited).unwrap_or(PREFIX_RAM);
    for item in scope.all(&coll.source) {
        let mut element = Element::with_prefix(prefix, &coll.name);
        let item_scope = scope.rescope(Some(item));
        apply(&coll.items, &item_scope, &mut element, Some(prefix));
        out.add_child(element);
    }
}

type ValueFormatter = fn(&str) -> Option<String>;

/// Per-target-element-name formatting policy. Dispatch lives here so new
/// formatted kinds are added without touching the interpreter.
fn formatter_for(element_name: &str) -> Option<ValueFormatter> {
    match element_name {
        "DateTimeString" => Some(format_date_102),
        _ => None,
    }
}

/// Render any date shape the source schema allows as the CII `format="102"`
/// form, `YYYYMMDD`. Unparseable input degrades to an absent value.
fn format_date_102(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d%:z"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .ok()?;
    Some(date.format("%Y%m%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{collection, element};
    use crate::xml::Document;

    const BINDINGS: &[(&str, &str)] = &[("cbc", "urn:cbc"), ("cac", "urn:cac")];

    fn build(xml: &str, rules: RuleSet) -> Element {
        let doc = Document::parse(xml).unwrap();
        let mut out = Element::with_prefix("rsm", "Out");
        let binding = doc.root.as_ref().unwrap();
        let scope = Scope::new(binding, BINDINGS);
        apply(&rules, &scope, &mut out, None);
        out
    }

    #[test]
    fn date_formatting_accepts_date_and_datetime_shapes() {
        assert_eq!(format_date_102("2023-01-01").as_deref(), Some("20230101"));
        assert_eq!(
            format_date_102("2009-12-15T10:30:00").as_deref(),
            Some("20091215")
        );
        assert_eq!(
            format_date_102("2009-12-15T10:30:00+01:00").as_deref(),
            Some("20091215")
        );
        assert_eq!(format_date_102(" 2023-01-01 ").as_deref(), Some("20230101"));
        assert!(format_date_102("not a date").is_none());
        assert!(format_date_102("2023-13-40").is_none());
        assert!(format_date_102("").is_none());
    }

    #[test]
    fn formatted_field_without_a_value_is_left_bare() {
        let out = build(
            r#"<r xmlns:cbc="urn:cbc"><cbc:IssueDate>soon-ish</cbc:IssueDate></r>"#,
            rules![
                element("DateTimeString")
                    .source("//cbc:IssueDate")
                    .prop("format", "102"),
                element("DateTimeString")
                    .source("//cbc:Missing")
                    .prop("format", "102"),
            ],
        );
        // Unparseable and absent dates alike: no text, and no `format`
        // attribute that would keep the element past pruning.
        for child in &out.children {
            assert!(child.text.is_none());
            assert!(child.attributes.is_empty());
        }
    }

    #[test]
    fn field_without_match_is_emitted_empty() {
        let out = build(
            r#"<r xmlns:cbc="urn:cbc"/>"#,
            rules![element("ID").source("//cbc:Missing")],
        );
        assert_eq!(out.children.len(), 1);
        assert!(out.children[0].text.is_none());
        assert!(out.children[0].attributes.is_empty());
    }

    #[test]
    fn prefix_inheritance_uses_nearest_enclosing_prefix() {
        let out = build(
            r#"<r xmlns:cbc="urn:cbc"><cbc:Note>n</cbc:Note></r>"#,
            rules![
                element("Wrapper").prefix("rsm").children(rules![
                    element("Inner").prefix("udt").children(rules![
                        element("Content").source("//cbc:Note"),
                    ]),
                    element("Sibling"),
                ]),
            ],
        );
        let wrapper = &out.children[0];
        assert_eq!(wrapper.prefix.as_deref(), Some("rsm"));
        assert_eq!(wrapper.children[0].prefix.as_deref(), Some("udt"));
        // Content inherits udt from Inner, not rsm and not the ram default.
        assert_eq!(wrapper.children[0].children[0].prefix.as_deref(), Some("udt"));
        // Sibling inherits rsm from Wrapper.
        assert_eq!(wrapper.children[1].prefix.as_deref(), Some("rsm"));
    }

    #[test]
    fn top_level_default_prefix_is_ram() {
        let out = build("<r/>", rules![element("Anything")]);
        assert_eq!(out.children[0].prefix.as_deref(), Some("ram"));
    }

    #[test]
    fn literal_property_overrides_source_attribute() {
        let out = build(
            r#"<r xmlns:cbc="urn:cbc"><cbc:ID schemeID="FROM-SOURCE">x</cbc:ID></r>"#,
            rules![
                element("ID")
                    .source("//cbc:ID")
                    .attr("schemeID")
                    .prop("schemeID", "LITERAL"),
            ],
        );
        assert_eq!(out.children[0].attr("schemeID"), Some("LITERAL"));
        assert_eq!(out.children[0].attributes.len(), 1);
    }

    #[test]
    fn derived_property_resolves_against_the_field_scope() {
        let out = build(
            r#"<r xmlns:cbc="urn:cbc" xmlns:cac="urn:cac">
                 <cbc:CompanyID>DE123</cbc:CompanyID>
                 <cac:TaxScheme><cbc:ID>VAT</cbc:ID></cac:TaxScheme>
               </r>"#,
            rules![
                element("ID")
                    .source("//cbc:CompanyID")
                    .prop_path("schemeID", "cac:TaxScheme//cbc:ID"),
            ],
        );
        assert_eq!(out.children[0].text.as_deref(), Some("DE123"));
        assert_eq!(out.children[0].attr("schemeID"), Some("VAT"));
    }

    #[test]
    fn missing_source_attribute_is_omitted() {
        let out = build(
            r#"<r xmlns:cbc="urn:cbc"><cbc:Amount>10.00</cbc:Amount></r>"#,
            rules![element("Amount").source("//cbc:Amount").attr("currencyID")],
        );
        assert_eq!(out.children[0].text.as_deref(), Some("10.00"));
        assert!(out.children[0].attr("currencyID").is_none());
    }

    #[test]
    fn collection_emits_one_wrapper_per_match_in_order() {
        let out = build(
            r#"<r xmlns:cbc="urn:cbc" xmlns:cac="urn:cac">
                 <cac:Line><cbc:ID>1</cbc:ID></cac:Line>
                 <cac:Line><cbc:ID>2</cbc:ID></cac:Line>
                 <cac:Line><cbc:ID>3</cbc:ID></cac:Line>
               </r>"#,
            rules![
                collection("Item", "//cac:Line")
                    .prefix("ram")
                    .items(rules![element("LineID").source("cbc:ID")]),
            ],
        );
        assert_eq!(out.children.len(), 3);
        let ids: Vec<&str> = out
            .children
            .iter()
            .map(|item| item.children[0].text.as_deref().unwrap())
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn collection_without_matches_emits_nothing() {
        let out = build(
            "<r/>",
            rules![collection("Item", "//cac:Line").items(rules![element("ID")])],
        );
        assert!(out.children.is_empty());
    }

    #[test]
    fn rescope_without_match_still_emits_empty_children() {
        let out = build(
            r#"<r xmlns:cbc="urn:cbc"><cbc:ID>visible</cbc:ID></r>"#,
            rules![
                element("Wrapper").rescope("//cbc:Missing").children(rules![
                    // Dead scope: even the absolute path finds nothing.
                    element("ID").source("//cbc:ID"),
                ]),
            ],
        );
        assert!(out.children[0].children[0].text.is_none());
    }

    #[test]
    fn nested_field_ignores_value_extraction() {
        let out = build(
            r#"<r xmlns:cbc="urn:cbc"><cbc:ID>text</cbc:ID></r>"#,
            rules![
                element("Wrapper")
                    .source("//cbc:ID")
                    .children(rules![element("Inner")]),
            ],
        );
        // Wrapper has children, so it never takes text of its own.
        assert!(out.children[0].text.is_none());
        assert_eq!(out.children[0].children.len(), 1);
    }
}
