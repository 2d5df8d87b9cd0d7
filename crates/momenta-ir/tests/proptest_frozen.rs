//! Property-based tests for freezing, hashing and persistence.
//!
//! Tests that freeze/unfreeze and JSON persistence preserve moments, tags
//! and the structural hash.

use momenta_ir::{FrozenProgram, InsertStrategy, Operation, Program, Qubit, StandardGate, Tag};
use proptest::prelude::*;

/// Operations drawn from a small gate set on up to five line qubits.
#[derive(Debug, Clone)]
enum GateOp {
    H(i64),
    Rz(i64, f64),
    CZ(i64, i64),
    Measure(i64, u8),
}

impl GateOp {
    fn build(self) -> Option<Operation> {
        match self {
            GateOp::H(q) => Operation::gate(StandardGate::H, [Qubit::line(q)]).ok(),
            GateOp::Rz(q, theta) => {
                Operation::gate(StandardGate::Rz(theta.into()), [Qubit::line(q)]).ok()
            }
            GateOp::CZ(a, b) => {
                Operation::gate(StandardGate::CZ, [Qubit::line(a), Qubit::line(b)]).ok()
            }
            GateOp::Measure(q, key) => Operation::measure([Qubit::line(q)], format!("m{key}")).ok(),
        }
    }
}

fn arb_gate_op() -> impl Strategy<Value = GateOp> {
    prop_oneof![
        (0_i64..5).prop_map(GateOp::H),
        // Quarter turns survive a JSON round trip exactly.
        (0_i64..5, -8_i32..8).prop_map(|(q, k)| GateOp::Rz(q, f64::from(k) / 4.0)),
        (0_i64..5, 0_i64..5).prop_map(|(a, b)| GateOp::CZ(a, b)),
        (0_i64..5, 0_u8..3).prop_map(|(q, k)| GateOp::Measure(q, k)),
    ]
}

fn arb_strategy() -> impl Strategy<Value = InsertStrategy> {
    prop_oneof![
        Just(InsertStrategy::Earliest),
        Just(InsertStrategy::New),
        Just(InsertStrategy::Inline),
        Just(InsertStrategy::NewThenInline),
    ]
}

fn arb_program() -> impl Strategy<Value = Program> {
    (
        prop::collection::vec(arb_gate_op(), 0..=20),
        arb_strategy(),
        prop::collection::vec(prop_oneof![
            "[a-z]{1,4}".prop_map(Tag::Name),
            any::<i64>().prop_map(Tag::Int),
        ], 0..=3),
    )
        .prop_map(|(ops, strategy, tags)| {
            // Invalid picks such as CZ(q, q) are skipped.
            Program::from_content(ops.into_iter().filter_map(GateOp::build), strategy)
                .with_tags(tags)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn unfreeze_freeze_round_trip(program in arb_program()) {
        let frozen = program.freeze();
        let back = frozen.unfreeze();
        prop_assert_eq!(back.moments(), program.moments());
        prop_assert_eq!(back.tags(), program.tags());
        prop_assert_eq!(back.freeze(), frozen.clone());
        prop_assert_eq!(frozen.freeze(), frozen);
    }

    #[test]
    fn hash_is_stable(program in arb_program()) {
        let frozen = program.freeze();
        let first = frozen.structural_hash();
        prop_assert_eq!(frozen.structural_hash(), first);
        prop_assert_eq!(program.freeze().structural_hash(), first);
    }

    #[test]
    fn persist_round_trip_recomputes_hash(program in arb_program()) {
        let frozen = program.freeze();
        let hash = frozen.structural_hash();
        let json = serde_json::to_string(&frozen).expect("persist");
        let back: FrozenProgram = serde_json::from_str(&json).expect("restore");
        prop_assert_eq!(&back, &frozen);
        prop_assert_eq!(back.structural_hash(), hash);
    }

    #[test]
    fn moments_stay_disjoint(program in arb_program()) {
        for moment in program.moments() {
            let qubits: Vec<_> = moment.operations().iter().flat_map(|op| op.qubits()).collect();
            let mut unique = qubits.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), qubits.len());
        }
    }

    #[test]
    fn with_tags_keeps_moments(program in arb_program(), extra in "[a-z]{1,3}") {
        let frozen = program.freeze();
        let tagged = frozen.with_tags([Tag::Name(extra.clone())]);
        prop_assert!(tagged.shares_moments_with(&frozen));
        prop_assert_eq!(tagged.tags().len(), frozen.tags().len() + 1);
        prop_assert_eq!(tagged.tags().last(), Some(&Tag::Name(extra)));
    }
}
