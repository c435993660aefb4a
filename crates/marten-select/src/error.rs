//! Selector engine errors.

use thiserror::Error;

/// Errors raised while parsing or evaluating a selector.
///
/// Every error is reported synchronously; a failed query never returns
/// partial results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// No grammar rule matches the remaining expression text.
    #[error("invalid selector {expression:?}: unexpected input at offset {position}")]
    Parse {
        /// The full expression being parsed.
        expression: String,
        /// Byte offset of the first unconsumed character.
        position: usize,
    },

    /// A `prefix|name` selector used a prefix absent from the context.
    #[error("namespace prefix {0:?} is not registered")]
    UnregisteredPrefix(String),

    /// `:not()` was nested inside `:not()`.
    #[error(":not() cannot contain another :not()")]
    InvalidNegation,

    /// A pseudo-class (or pseudo-element) outside the supported registry.
    #[error("unsupported selector :{0}")]
    Unsupported(String),

    /// A malformed argument, e.g. an `nth-child` expression or a reserved
    /// namespace prefix bound to the wrong URI.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
