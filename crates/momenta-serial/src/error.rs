//! Error types for the serialization crate.

use thiserror::Error;

/// Errors that can occur while decoding records or persisting programs.
///
/// All of these indicate malformed input; none are retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerialError {
    /// A record referenced a constant past the end of the table.
    #[error("Constant index {index} is out of range for a table of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The constant at an index is not the kind the record expects.
    #[error("Constant at index {index} was expected to be a {expected}, but it is a {actual}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// A parameter map key is not a name or a symbol.
    #[error("Invalid parameter key type: expected a name or symbol, found {kind} ({arg})")]
    InvalidKeyType { kind: &'static str, arg: String },

    /// A parameter map value is not a name, symbol or number.
    #[error(
        "Invalid parameter value type: expected a name, symbol or number, found {kind} ({arg})"
    )]
    InvalidValueType { kind: &'static str, arg: String },

    /// A gate record could not be turned into a gate.
    #[error("Invalid gate '{gate}': {reason}")]
    InvalidGate { gate: String, reason: String },

    /// A condition record could not be decoded.
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// The constant table references itself in a cycle.
    #[error("Constant at index {index} is part of a reference cycle")]
    CyclicReference { index: usize },

    /// A tag cannot be represented in the persisted form.
    #[error("Tag {tag} cannot be persisted; only string and integer tags are")]
    NonPersistableTag { tag: String },

    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] momenta_ir::IrError),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for serialization operations.
pub type SerialResult<T> = Result<T, SerialError>;
