//! Derived queries over a moment sequence.
//!
//! Shared by [`Program`](crate::Program), which computes them on demand, and
//! [`FrozenProgram`](crate::FrozenProgram), which memoizes them.

use std::collections::BTreeSet;

use crate::moment::Moment;
use crate::operation::Operation;
use crate::qubit::Qubit;

/// All operations in time order.
pub fn all_operations(moments: &[Moment]) -> impl Iterator<Item = &Operation> {
    moments.iter().flat_map(Moment::operations)
}

/// Every qubit acted on.
pub fn qubits(moments: &[Moment]) -> BTreeSet<Qubit> {
    all_operations(moments)
        .flat_map(|op| op.qubits().iter().cloned())
        .collect()
}

/// Total number of operations.
pub fn operation_count(moments: &[Moment]) -> usize {
    moments.iter().map(Moment::len).sum()
}

/// Measurement keys written anywhere.
pub fn measurement_keys(moments: &[Moment]) -> BTreeSet<String> {
    all_operations(moments)
        .flat_map(Operation::measurement_keys)
        .collect()
}

/// Keys read by some operation and not measured anywhere in the sequence.
pub fn control_keys(moments: &[Moment]) -> BTreeSet<String> {
    let measured = measurement_keys(moments);
    all_operations(moments)
        .flat_map(Operation::control_keys)
        .filter(|key| !measured.contains(key))
        .collect()
}

/// Names of free parameters.
pub fn parameter_names(moments: &[Moment]) -> BTreeSet<String> {
    all_operations(moments)
        .flat_map(Operation::parameter_names)
        .collect()
}

/// Check if every operation applies a unitary.
pub fn has_unitary(moments: &[Moment]) -> bool {
    all_operations(moments).all(Operation::has_unitary)
}

/// Check if any operation writes a measurement key.
pub fn has_measurements(moments: &[Moment]) -> bool {
    all_operations(moments).any(|op| !op.measurement_keys().is_empty())
}

/// Check if no operation follows a measurement on any of its qubits.
pub fn are_all_measurements_terminal(moments: &[Moment]) -> bool {
    let mut measured: BTreeSet<&Qubit> = BTreeSet::new();
    for op in all_operations(moments) {
        if op.qubits().iter().any(|q| measured.contains(q)) {
            return false;
        }
        if !op.measurement_keys().is_empty() {
            measured.extend(op.qubits());
        }
    }
    true
}
