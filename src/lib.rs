//! # ubl2cii
//!
//! Transcodes UBL 2.1 invoices into UN/CEFACT Cross Industry Invoice (CII)
//! XML, driven by a declarative mapping table rather than per-field code.
//!
//! The engine walks an ordered [`mapper::RuleSet`] against the parsed source
//! document, emits the target tree in rule order, prunes vestigial empty
//! wrappers, and serializes with a fixed set of namespace declarations.
//! Conversion is a pure function of the input text: no I/O, no shared state,
//! safe to run from any number of threads.
//!
//! ## Quick Start
//!
//! ```rust
//! let ubl = r#"<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
//!     xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
//!   <cbc:ID>INV-001</cbc:ID>
//!   <cbc:IssueDate>2023-01-01</cbc:IssueDate>
//! </Invoice>"#;
//!
//! let cii = ubl2cii::convert(ubl).unwrap();
//! assert!(cii.contains("<ram:ID>INV-001</ram:ID>"));
//! assert!(cii.contains("<udt:DateTimeString format=\"102\">20230101</udt:DateTimeString>"));
//! ```

pub mod converter;
pub mod mapper;
pub mod xml;

mod error;

pub use converter::{REQUIRED_ELEMENTS, convert, prune_empty};
pub use error::ConvertError;

/// UBL 2.1 namespace URIs (source vocabulary).
pub mod ubl_ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}

/// CII namespace URIs (target vocabulary).
pub mod cii_ns {
    pub const RSM: &str = "urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100";
    pub const RAM: &str =
        "urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100";
    pub const QDT: &str = "urn:un:unece:uncefact:data:standard:QualifiedDataType:100";
    pub const UDT: &str = "urn:un:unece:uncefact:data:standard:UnqualifiedDataType:100";
}

pub const PREFIX_RSM: &str = "rsm";
pub const PREFIX_RAM: &str = "ram";
pub const PREFIX_UDT: &str = "udt";
pub const PREFIX_QDT: &str = "qdt";
pub const PREFIX_CBC: &str = "cbc";
pub const PREFIX_CAC: &str = "cac";

/// Prefix bindings used to evaluate source paths, independent of whatever
/// prefixes the input document declares.
pub const SOURCE_BINDINGS: &[(&str, &str)] = &[
    (PREFIX_RSM, cii_ns::RSM),
    (PREFIX_RAM, cii_ns::RAM),
    (PREFIX_UDT, cii_ns::UDT),
    (PREFIX_CBC, ubl_ns::CBC),
    (PREFIX_CAC, ubl_ns::CAC),
];

/// Namespace declarations carried on the output root element. `qdt` is
/// declared for schema conformance even though the mapping table never
/// emits into it.
pub const TARGET_DECLARATIONS: &[(&str, &str)] = &[
    (PREFIX_RSM, cii_ns::RSM),
    (PREFIX_RAM, cii_ns::RAM),
    (PREFIX_QDT, cii_ns::QDT),
    (PREFIX_UDT, cii_ns::UDT),
];
