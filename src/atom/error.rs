use thiserror::Error;

use super::tree::TreeError;

/// Errors raised while writing or reading an Atom document.
///
/// Writing always reports problems. Reading reports `Constraint` errors only
/// in [`Mode::Strict`](super::Mode::Strict).
#[derive(Debug, Error)]
pub enum AtomError {
    /// Caller supplied empty input where a document was expected.
    #[error("{0}")]
    Argument(String),

    /// A required field is missing or malformed.
    #[error("{0}")]
    Constraint(String),

    /// A value has no wire representation.
    #[error("{0}")]
    UnsupportedValue(String),

    /// The input is not well-formed XML.
    #[error("Malformed XML: {0}")]
    Xml(#[from] TreeError),

    /// Reading the input stream failed.
    #[error("Failed to read XML stream: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering the document to its text form failed.
    #[error("Failed to write XML: {0}")]
    Write(String),
}

impl AtomError {
    pub(crate) fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint(message.into())
    }

    /// Message of a `Constraint` error, `None` for the other kinds.
    pub fn constraint_message(&self) -> Option<&str> {
        match self {
            Self::Constraint(message) => Some(message),
            _ => None,
        }
    }
}
