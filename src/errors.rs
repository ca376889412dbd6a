use thiserror::Error;

/// Everything that can go wrong while parsing, compiling or running a query.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// Malformed query text. `offset` is a byte offset into the source.
    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// A call names a function that is neither built in nor registered
    /// for this compile.
    #[error("unknown function \"{name}\"")]
    UnknownFunction { name: String },

    /// A builder received an invalid number of arguments.
    #[error("\"{name}\" expects {expected} arguments, got {actual}")]
    Arity {
        name: String,
        expected: String,
        actual: usize,
    },

    /// An operation met a value it has no defined behavior for, e.g.
    /// `split` applied to a number. Raised at build time when an argument
    /// must be a literal of a particular shape.
    #[error("{op}: unexpected {observed}")]
    Type { op: &'static str, observed: String },
}

impl Error {
    pub(crate) fn arity(name: &str, expected: impl Into<String>, actual: usize) -> Error {
        Error::Arity {
            name: name.to_string(),
            expected: expected.into(),
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
