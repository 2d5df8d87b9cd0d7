//! Moments: time-slices of operations on disjoint qubits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{IrError, IrResult};
use crate::operation::Operation;
use crate::qubit::Qubit;

/// An ordered collection of operations acting on pairwise disjoint qubits.
///
/// Equality is positional: two moments holding the same operations in a
/// different order are not equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Operation>", into = "Vec<Operation>")]
pub struct Moment {
    operations: Vec<Operation>,
}

impl Moment {
    /// Create an empty moment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a moment from operations, checking that no qubit is shared.
    pub fn from_operations(operations: impl IntoIterator<Item = Operation>) -> IrResult<Self> {
        let mut moment = Self::new();
        for op in operations {
            moment.push(op)?;
        }
        Ok(moment)
    }

    /// Build a moment whose disjointness the caller has already established.
    pub(crate) fn from_disjoint(operations: Vec<Operation>) -> Self {
        debug_assert!(Self::from_operations(operations.clone()).is_ok());
        Self { operations }
    }

    /// Add an operation, failing if it shares a qubit with an existing one.
    pub fn push(&mut self, op: Operation) -> IrResult<()> {
        if let Some((existing, qubit)) = self.first_overlap(op.qubits()) {
            return Err(IrError::OverlappingOperations {
                first: existing.name(),
                second: op.name(),
                qubit: qubit.clone(),
            });
        }
        self.operations.push(op);
        Ok(())
    }

    /// Return a copy with an extra operation.
    pub fn with_operation(&self, op: Operation) -> IrResult<Self> {
        let mut moment = self.clone();
        moment.push(op)?;
        Ok(moment)
    }

    pub(crate) fn push_disjoint(&mut self, op: Operation) {
        debug_assert!(!self.operates_on(op.qubits()));
        self.operations.push(op);
    }

    fn first_overlap<'a>(&'a self, qubits: &'a [Qubit]) -> Option<(&'a Operation, &'a Qubit)> {
        self.operations.iter().find_map(|existing| {
            qubits
                .iter()
                .find(|q| existing.qubits().contains(q))
                .map(|q| (existing, q))
        })
    }

    /// The operations in this moment, in insertion order.
    #[inline]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the moment holds no operations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The qubits touched by this moment.
    pub fn qubits(&self) -> BTreeSet<&Qubit> {
        self.operations.iter().flat_map(|op| op.qubits()).collect()
    }

    /// Check if any operation acts on one of `qubits`.
    pub fn operates_on(&self, qubits: &[Qubit]) -> bool {
        self.operations
            .iter()
            .any(|op| op.qubits().iter().any(|q| qubits.contains(q)))
    }

    /// Measurement keys written in this moment.
    pub fn measurement_keys(&self) -> BTreeSet<String> {
        self.operations
            .iter()
            .flat_map(Operation::measurement_keys)
            .collect()
    }

    /// Measurement keys read in this moment.
    pub fn control_keys(&self) -> BTreeSet<String> {
        self.operations
            .iter()
            .flat_map(Operation::control_keys)
            .collect()
    }

    /// Check if `op` can join this moment without sharing a qubit or racing
    /// on a measurement key.
    pub fn can_accept(&self, op: &Operation) -> bool {
        if self.operates_on(op.qubits()) {
            return false;
        }
        let measured = self.measurement_keys();
        let read = self.control_keys();
        let op_measured = op.measurement_keys();
        op.control_keys().is_disjoint(&measured)
            && op_measured.is_disjoint(&measured)
            && op_measured.is_disjoint(&read)
    }
}

impl TryFrom<Vec<Operation>> for Moment {
    type Error = IrError;

    fn try_from(operations: Vec<Operation>) -> IrResult<Self> {
        Self::from_operations(operations)
    }
}

impl From<Moment> for Vec<Operation> {
    fn from(moment: Moment) -> Self {
        moment.operations
    }
}

impl<'a> IntoIterator for &'a Moment {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
