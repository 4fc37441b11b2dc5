use thiserror::Error;

/// Errors that can abort a conversion.
///
/// Per-field misses are never errors: a source path that matches nothing
/// yields an absent value and the conversion completes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// Input could not be parsed into an XML tree.
    #[error("malformed XML input: {0}")]
    Parse(String),

    /// Input parsed but produced no usable root element.
    #[error("input document has no root element")]
    EmptyDocument,

    /// Serializing the output tree failed.
    #[error("XML write error: {0}")]
    Write(String),
}
