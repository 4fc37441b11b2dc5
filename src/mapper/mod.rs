//! The declarative mapping model and the interpreter that applies it.
//!
//! A mapping is an ordered [`RuleSet`] of [`Rule`]s, built once (the static
//! schema description) and applied to any number of source documents. Rule
//! order is output order; source document order only matters inside a
//! collection, where items mirror the source sequence.

/// Assemble a [`RuleSet`] from field and collection builders.
macro_rules! rules {
    ($($rule:expr),* $(,)?) => {
        $crate::mapper::RuleSet::new(vec![$($rule.into()),*])
    };
}

mod build;
pub mod cii;
mod rules;

pub use build::apply;
pub use rules::{AttrSource, CollectionRule, FieldRule, Rule, RuleSet, collection, element};
