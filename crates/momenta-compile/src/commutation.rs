//! Commutation predicates between operations.

use momenta_ir::{Gate, Operation, OperationKind, Qubit, StandardGate};

/// A three-valued commutation test.
///
/// `Some(true)` means the two operations may be swapped, `Some(false)` that
/// they may not, and `None` that the predicate cannot tell. Callers treat
/// `None` like `Some(false)`. The predicate need not be symmetric.
pub trait Commutation: Send + Sync {
    /// Whether `first` followed by `second` equals `second` followed by `first`.
    fn commutes(&self, first: &Operation, second: &Operation) -> Option<bool>;
}

impl<F> Commutation for F
where
    F: Fn(&Operation, &Operation) -> Option<bool> + Send + Sync,
{
    fn commutes(&self, first: &Operation, second: &Operation) -> Option<bool> {
        self(first, second)
    }
}

/// Structural commutation rules that need no matrix arithmetic.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleCommutation;

impl Commutation for RuleCommutation {
    fn commutes(&self, first: &Operation, second: &Operation) -> Option<bool> {
        // Writing a key that the other operation reads or writes fixes order.
        let first_measured = first.measurement_keys();
        let second_measured = second.measurement_keys();
        if !first_measured.is_disjoint(&second_measured)
            || !first_measured.is_disjoint(&second.control_keys())
            || !second_measured.is_disjoint(&first.control_keys())
        {
            return Some(false);
        }

        let shared: Vec<_> = first
            .qubits()
            .iter()
            .filter(|q| second.qubits().contains(q))
            .collect();
        if shared.is_empty() {
            return Some(true);
        }
        if first == second {
            return Some(true);
        }

        match (first.kind(), second.kind()) {
            (OperationKind::Gate(a), OperationKind::Gate(b)) => {
                gates_commute(a, first, b, second, &shared)
            }
            (OperationKind::Measure { .. } | OperationKind::Reset, _)
            | (_, OperationKind::Measure { .. } | OperationKind::Reset) => Some(false),
            _ => None,
        }
    }
}

/// Rules for two gates sharing at least one qubit.
fn gates_commute(
    a: &Gate,
    op_a: &Operation,
    b: &Gate,
    op_b: &Operation,
    shared: &[&Qubit],
) -> Option<bool> {
    // Diagonal gates commute with each other
    if a.is_diagonal() && b.is_diagonal() {
        return Some(true);
    }

    let (Gate::Standard(a), Gate::Standard(b)) = (a, b) else {
        return None;
    };
    match (a, b) {
        // Rotations about the same axis on the same qubit
        (StandardGate::X | StandardGate::Rx(_), StandardGate::X | StandardGate::Rx(_))
        | (StandardGate::Y | StandardGate::Ry(_), StandardGate::Y | StandardGate::Ry(_)) => {
            Some(true)
        }

        // CX pairs where no control meets a target
        (StandardGate::CX, StandardGate::CX) => {
            let (ca, ta) = (&op_a.qubits()[0], &op_a.qubits()[1]);
            let (cb, tb) = (&op_b.qubits()[0], &op_b.qubits()[1]);
            Some(ca != tb && ta != cb)
        }

        // Diagonal gates meeting a CX only on its control
        (StandardGate::CX, d) if d.is_diagonal() => {
            Some(shared.iter().all(|q| *q == &op_a.qubits()[0]))
        }
        (d, StandardGate::CX) if d.is_diagonal() => {
            Some(shared.iter().all(|q| *q == &op_b.qubits()[0]))
        }

        // X-type gates on the target of a CX
        (StandardGate::CX, StandardGate::X | StandardGate::Rx(_)) => {
            Some(op_b.qubits()[0] == op_a.qubits()[1])
        }
        (StandardGate::X | StandardGate::Rx(_), StandardGate::CX) => {
            Some(op_a.qubits()[0] == op_b.qubits()[1])
        }

        _ => None,
    }
}
