//! Commutation-guarded insertion sort of operations by qubit tuple.

use tracing::debug;

use momenta_ir::{InsertStrategy, Operation, Program, Qubit};

use crate::commutation::{Commutation, RuleCommutation};
use crate::context::PassContext;
use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};

/// Counts reported by the last [`InsertionSort`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortStats {
    /// Operations visited.
    pub operations: usize,
    /// Operations placed ahead of at least one earlier operation.
    pub moved: usize,
}

/// Sorts operations by their sorted qubit tuple, swapping only operations
/// that provably commute.
///
/// Operations are visited in time order. Each one moves back past the tail
/// of the already placed list while its qubit tuple is strictly smaller than
/// the tail's and the predicate reports `commutes(tail, op) == Some(true)`.
/// The result is repacked with [`InsertStrategy::Earliest`]. Program tags
/// are kept.
pub struct InsertionSort {
    commutation: Box<dyn Commutation>,
}

impl InsertionSort {
    /// Create a sort using [`RuleCommutation`].
    pub fn new() -> Self {
        Self::with_commutation(RuleCommutation)
    }

    /// Create a sort using a custom commutation predicate.
    pub fn with_commutation(commutation: impl Commutation + 'static) -> Self {
        Self {
            commutation: Box::new(commutation),
        }
    }

    /// Sort a flat operation sequence, returning the final order.
    pub fn sort_operations(
        &self,
        operations: impl IntoIterator<Item = Operation>,
    ) -> Vec<Operation> {
        self.sort_with_stats(operations).0
    }

    fn sort_with_stats(
        &self,
        operations: impl IntoIterator<Item = Operation>,
    ) -> (Vec<Operation>, SortStats) {
        let mut placed: Vec<(Vec<Qubit>, Operation)> = Vec::new();
        let mut stats = SortStats::default();

        for op in operations {
            let mut key = op.qubits().to_vec();
            key.sort();

            let mut index = placed.len();
            for (tail_key, tail_op) in placed.iter().rev() {
                if key < *tail_key && self.commutation.commutes(tail_op, &op) == Some(true) {
                    index -= 1;
                    continue;
                }
                break;
            }

            stats.operations += 1;
            if index < placed.len() {
                stats.moved += 1;
            }
            placed.insert(index, (key, op));
        }

        (placed.into_iter().map(|(_, op)| op).collect(), stats)
    }
}

impl Default for InsertionSort {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for InsertionSort {
    fn name(&self) -> &'static str {
        "InsertionSort"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, program: &Program, context: &mut PassContext) -> CompileResult<Program> {
        let (sorted, stats) = self.sort_with_stats(program.all_operations().cloned());
        debug!(
            "InsertionSort: moved {} of {} operations",
            stats.moved, stats.operations
        );
        context.insert(stats);

        Ok(Program::from_content(sorted, InsertStrategy::Earliest)
            .with_tags(program.tags().iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use momenta_ir::StandardGate;
    use num_complex::Complex64;

    fn cz(a: i64, b: i64) -> Operation {
        Operation::gate(StandardGate::CZ, [Qubit::line(a), Qubit::line(b)]).unwrap()
    }

    fn phase() -> Operation {
        Operation::gate(StandardGate::global_phase(Complex64::new(0.0, 1.0)), []).unwrap()
    }

    #[test]
    fn test_sorts_commuting_operations() {
        let sort = InsertionSort::new();
        let sorted = sort.sort_operations([cz(2, 1), cz(2, 4), cz(0, 1), cz(2, 1), phase()]);
        assert_eq!(sorted, vec![phase(), cz(0, 1), cz(2, 1), cz(2, 1), cz(2, 4)]);
    }

    #[test]
    fn test_unknown_blocks_reordering() {
        let sort = InsertionSort::with_commutation(|_: &Operation, _: &Operation| -> Option<bool> {
            None
        });
        let ops = vec![cz(2, 1), cz(0, 1), phase()];
        assert_eq!(sort.sort_operations(ops.clone()), ops);
    }

    #[test]
    fn test_predicate_argument_order() {
        // Only the placed (tail) operation being CZ(2, 3) lets others pass it.
        let tail = cz(2, 3);
        let probe = tail.clone();
        let sort = InsertionSort::with_commutation(move |t: &Operation, _: &Operation| {
            Some(*t == probe)
        });
        assert_eq!(
            sort.sort_operations([cz(2, 3), cz(0, 1)]),
            vec![cz(0, 1), tail.clone()]
        );
        assert_eq!(
            sort.sort_operations([cz(4, 5), cz(2, 3)]),
            vec![cz(4, 5), tail]
        );
    }

    #[test]
    fn test_run_reports_stats() {
        let program = Program::from_content([cz(2, 1), cz(0, 1)], InsertStrategy::Earliest);
        let mut context = PassContext::new();
        let sorted = InsertionSort::new().run(&program, &mut context).unwrap();

        assert_eq!(
            sorted,
            Program::from_content([cz(0, 1), cz(2, 1)], InsertStrategy::Earliest)
        );
        assert_eq!(
            context.get::<SortStats>(),
            Some(&SortStats {
                operations: 2,
                moved: 1
            })
        );
    }
}
