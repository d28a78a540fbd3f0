use thiserror::Error;

/// Why a parse stopped before the end of the document.
///
/// The tree built up to that point is still well-formed, just partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    #[error("parse cancelled")]
    Cancelled,
    #[error("source changed while parsing")]
    SourceChanged,
}
