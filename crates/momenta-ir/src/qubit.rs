//! Qubit (operand) types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An addressable unit that operations act on.
///
/// Qubits are totally ordered: all line qubits sort before all grid qubits,
/// which sort before all named qubits. Within a kind, ordering follows the
/// index, the `(row, col)` pair, or the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Qubit {
    /// A qubit on a line, addressed by a single index.
    Line(i64),
    /// A qubit on a 2D grid.
    Grid {
        /// Row coordinate.
        row: i64,
        /// Column coordinate.
        col: i64,
    },
    /// A qubit addressed by name only.
    Named(String),
}

impl Qubit {
    /// Create a line qubit.
    pub fn line(index: i64) -> Self {
        Qubit::Line(index)
    }

    /// Create a grid qubit.
    pub fn grid(row: i64, col: i64) -> Self {
        Qubit::Grid { row, col }
    }

    /// Create a named qubit.
    pub fn named(name: impl Into<String>) -> Self {
        Qubit::Named(name.into())
    }

    /// Create `n` consecutive line qubits starting at index 0.
    pub fn line_range(n: i64) -> Vec<Self> {
        (0..n).map(Qubit::Line).collect()
    }

    /// Parse a qubit from its wire identifier.
    ///
    /// `"3_4"` is a grid qubit, `"7"` a line qubit, anything else a named qubit.
    pub fn from_proto_id(id: &str) -> Self {
        if let Some((row, col)) = id.split_once('_') {
            if let (Ok(row), Ok(col)) = (row.parse(), col.parse()) {
                return Qubit::Grid { row, col };
            }
        }
        match id.parse() {
            Ok(index) => Qubit::Line(index),
            Err(_) => Qubit::Named(id.to_string()),
        }
    }

    /// The wire identifier of this qubit.
    pub fn proto_id(&self) -> String {
        match self {
            Qubit::Line(index) => index.to_string(),
            Qubit::Grid { row, col } => format!("{row}_{col}"),
            Qubit::Named(name) => name.clone(),
        }
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qubit::Line(index) => write!(f, "q({index})"),
            Qubit::Grid { row, col } => write!(f, "q({row}, {col})"),
            Qubit::Named(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for Qubit {
    fn from(index: i64) -> Self {
        Qubit::Line(index)
    }
}
