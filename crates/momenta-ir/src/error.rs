//! Error types for the IR crate.

use thiserror::Error;

use crate::qubit::Qubit;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// The same qubit appears twice in one operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_op_context(.op_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: Qubit,
        /// Optional operation name for context.
        op_name: Option<String>,
    },

    /// Gate requires a different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Two operations placed in one moment act on a common qubit.
    #[error("Overlapping operations in moment: {first} and {second} both act on {qubit}")]
    OverlappingOperations {
        /// Name of the operation already in the moment.
        first: String,
        /// Name of the operation being added.
        second: String,
        /// The shared qubit.
        qubit: Qubit,
    },

    /// Explicit repetition ids do not match the repetition count.
    #[error("Expected {expected} repetition ids, got {got}")]
    RepetitionIdsMismatch {
        /// `|repetitions|`.
        expected: u64,
        /// Number of ids supplied.
        got: usize,
    },

    /// A termination condition was combined with repetitions.
    #[error("Cannot use repetitions or repetition ids together with repeat_until")]
    RepeatUntilWithRepetitions,

    /// The termination condition reads no key measured by the sub-program.
    #[error("Infinite loop: condition on {keys:?} is not modified in the sub-program")]
    InfiniteLoop {
        /// Keys read by the condition.
        keys: Vec<String>,
    },

    /// Negative repetitions of a sub-program that has no inverse.
    #[error("Sub-program with {repetitions} repetitions is not invertible")]
    NotInvertible {
        /// The requested repetition count.
        repetitions: i64,
    },
}

/// Helper function to format optional operation context.
#[allow(clippy::ref_option)]
fn format_op_context(op_name: &Option<String>) -> String {
    match op_name {
        Some(name) => format!(" (op: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
