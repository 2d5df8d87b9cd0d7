//! Mutable programs and the packing strategies that build them.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Mul};

use crate::analysis;
use crate::frozen::FrozenProgram;
use crate::moment::Moment;
use crate::operation::Operation;
use crate::qubit::Qubit;
use crate::tag::Tag;

/// How operations are packed into moments when added to a program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsertStrategy {
    /// Place each operation in the earliest moment that keeps its qubits and
    /// measurement keys ordered after everything it depends on.
    #[default]
    Earliest,
    /// Give every operation a moment of its own.
    New,
    /// Add to the last moment if it can take the operation, otherwise start
    /// a new one.
    Inline,
    /// Start a new moment for the first operation, then continue inline.
    NewThenInline,
}

/// An item added to a program: a single operation or a whole moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// An operation, placed by the insert strategy.
    Operation(Operation),
    /// A moment, always appended after the existing moments.
    Moment(Moment),
}

impl From<Operation> for Content {
    fn from(op: Operation) -> Self {
        Content::Operation(op)
    }
}

impl From<Moment> for Content {
    fn from(moment: Moment) -> Self {
        Content::Moment(moment)
    }
}

/// A mutable program: an ordered sequence of moments plus tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Program {
    moments: Vec<Moment>,
    #[serde(default)]
    tags: Vec<Tag>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a program from content items packed with `strategy`.
    pub fn from_content<I, C>(items: I, strategy: InsertStrategy) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Content>,
    {
        let mut program = Self::new();
        program.extend(items, strategy);
        program
    }

    /// Build a program holding exactly these moments and tags.
    pub fn from_moments(moments: impl IntoIterator<Item = Moment>, tags: Vec<Tag>) -> Self {
        Self {
            moments: moments.into_iter().collect(),
            tags,
        }
    }

    /// Append one item with the earliest strategy.
    pub fn append(&mut self, item: impl Into<Content>) -> &mut Self {
        self.extend([item], InsertStrategy::Earliest)
    }

    /// Append items packed with `strategy`.
    pub fn extend<I, C>(&mut self, items: I, strategy: InsertStrategy) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Content>,
    {
        let items = items.into_iter().map(|item| -> Content { item.into() });
        match strategy {
            InsertStrategy::Earliest => self.extend_earliest(items),
            InsertStrategy::New => {
                for item in items {
                    match item {
                        Content::Moment(moment) => self.moments.push(moment),
                        Content::Operation(op) => {
                            self.moments.push(Moment::from_disjoint(vec![op]));
                        }
                    }
                }
            }
            InsertStrategy::Inline => self.extend_inline(items, false),
            InsertStrategy::NewThenInline => self.extend_inline(items, true),
        }
        self
    }

    fn extend_earliest(&mut self, items: impl Iterator<Item = Content>) {
        let mut index = PlacementIndex::default();
        for (i, moment) in self.moments.iter().enumerate() {
            for op in moment {
                index.record(op, i);
            }
        }

        for item in items {
            match item {
                Content::Moment(moment) => {
                    let i = self.moments.len();
                    for op in &moment {
                        index.record(op, i);
                    }
                    self.moments.push(moment);
                }
                Content::Operation(op) => {
                    let i = index.earliest(&op);
                    index.record(&op, i);
                    if i == self.moments.len() {
                        self.moments.push(Moment::new());
                    }
                    self.moments[i].push_disjoint(op);
                }
            }
        }
    }

    fn extend_inline(&mut self, items: impl Iterator<Item = Content>, mut fresh: bool) {
        for item in items {
            match item {
                Content::Moment(moment) => self.moments.push(moment),
                Content::Operation(op) => match self.moments.last_mut() {
                    Some(last) if !fresh && last.can_accept(&op) => last.push_disjoint(op),
                    _ => self.moments.push(Moment::from_disjoint(vec![op])),
                },
            }
            fresh = false;
        }
    }

    /// The moments of this program.
    #[inline]
    pub fn moments(&self) -> &[Moment] {
        &self.moments
    }

    /// Tags attached to the program.
    #[inline]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Append tags, keeping order and duplicates.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Number of moments.
    #[inline]
    pub fn num_moments(&self) -> usize {
        self.moments.len()
    }

    /// Check if the program has no moments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    /// All operations in time order.
    pub fn all_operations(&self) -> impl Iterator<Item = &Operation> {
        analysis::all_operations(&self.moments)
    }

    /// Every qubit acted on.
    pub fn qubits(&self) -> BTreeSet<Qubit> {
        analysis::qubits(&self.moments)
    }

    /// Total number of operations.
    pub fn operation_count(&self) -> usize {
        analysis::operation_count(&self.moments)
    }

    /// Measurement keys written by the program.
    pub fn measurement_keys(&self) -> BTreeSet<String> {
        analysis::measurement_keys(&self.moments)
    }

    /// Keys read but never measured inside the program.
    pub fn control_keys(&self) -> BTreeSet<String> {
        analysis::control_keys(&self.moments)
    }

    /// Names of free parameters.
    pub fn parameter_names(&self) -> BTreeSet<String> {
        analysis::parameter_names(&self.moments)
    }

    /// Check if the program has free parameters.
    pub fn is_parameterized(&self) -> bool {
        !self.parameter_names().is_empty()
    }

    /// Check if every operation applies a unitary.
    pub fn has_unitary(&self) -> bool {
        analysis::has_unitary(&self.moments)
    }

    /// Check if any operation measures.
    pub fn has_measurements(&self) -> bool {
        analysis::has_measurements(&self.moments)
    }

    /// Check if no operation follows a measurement on one of its qubits.
    pub fn are_all_measurements_terminal(&self) -> bool {
        analysis::are_all_measurements_terminal(&self.moments)
    }

    /// Capture the program immutably.
    pub fn freeze(&self) -> FrozenProgram {
        FrozenProgram::from_moments(self.moments.clone(), self.tags.clone())
    }

    /// Consume the program into an immutable one without copying moments.
    pub fn into_frozen(self) -> FrozenProgram {
        FrozenProgram::from_moments(self.moments, self.tags)
    }

    /// This program followed by `other`'s moments. Tags come from `self`.
    #[must_use]
    pub fn concat(&self, other: &Program) -> Self {
        let mut program = self.clone();
        program.moments.extend(other.moments.iter().cloned());
        program
    }

    /// The moment sequence repeated `repetitions` times.
    ///
    /// Zero or negative counts give a program with no moments.
    #[must_use]
    pub fn repeat(&self, repetitions: i64) -> Self {
        let count = usize::try_from(repetitions).unwrap_or(0);
        Self {
            moments: std::iter::repeat_n(&self.moments, count)
                .flatten()
                .cloned()
                .collect(),
            tags: self.tags.clone(),
        }
    }

    /// The inverse program: moments reversed and every operation inverted.
    ///
    /// Returns `None` if some operation has no inverse.
    pub fn inverse(&self) -> Option<Self> {
        let moments = self
            .moments
            .iter()
            .rev()
            .map(|moment| {
                moment
                    .operations()
                    .iter()
                    .map(Operation::inverse)
                    .collect::<Option<Vec<_>>>()
                    .map(Moment::from_disjoint)
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            moments,
            tags: self.tags.clone(),
        })
    }

    /// Raise to a power. Only `1` and `-1` are supported; anything else
    /// returns `None`.
    pub fn pow(&self, exponent: i64) -> Option<Self> {
        match exponent {
            1 => Some(self.clone()),
            -1 => self.inverse(),
            _ => None,
        }
    }
}

impl Add for &Program {
    type Output = Program;

    fn add(self, rhs: &Program) -> Program {
        self.concat(rhs)
    }
}

impl Mul<i64> for &Program {
    type Output = Program;

    fn mul(self, repetitions: i64) -> Program {
        self.repeat(repetitions)
    }
}

impl FromIterator<Operation> for Program {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self::from_content(iter, InsertStrategy::Earliest)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_moments(&self.moments, &self.tags, f)
    }
}

pub(crate) fn fmt_moments(moments: &[Moment], tags: &[Tag], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, moment) in moments.iter().enumerate() {
        let ops = moment
            .operations()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "{i:>4}: {ops}")?;
    }
    if !tags.is_empty() {
        let tags = tags.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        writeln!(f, "tags: {tags}")?;
    }
    Ok(())
}

/// Last moment index touching each qubit and key, for earliest placement.
#[derive(Default)]
struct PlacementIndex {
    qubits: FxHashMap<Qubit, usize>,
    measured: FxHashMap<String, usize>,
    read: FxHashMap<String, usize>,
}

impl PlacementIndex {
    fn earliest(&self, op: &Operation) -> usize {
        let measured = op.measurement_keys();
        let read = op.control_keys();

        let after_qubits = op.qubits().iter().filter_map(|q| self.qubits.get(q));
        // Reads follow the measurement they read; measurements follow
        // earlier measurements and reads of the same key.
        let after_reads = read.iter().filter_map(|k| self.measured.get(k));
        let after_measures = measured
            .iter()
            .filter_map(|k| self.measured.get(k))
            .chain(measured.iter().filter_map(|k| self.read.get(k)));

        after_qubits
            .chain(after_reads)
            .chain(after_measures)
            .max()
            .map_or(0, |last| last + 1)
    }

    fn record(&mut self, op: &Operation, index: usize) {
        fn bump<K: std::hash::Hash + Eq>(map: &mut FxHashMap<K, usize>, key: K, index: usize) {
            let slot = map.entry(key).or_insert(index);
            *slot = (*slot).max(index);
        }
        for qubit in op.qubits() {
            bump(&mut self.qubits, qubit.clone(), index);
        }
        for key in op.measurement_keys() {
            bump(&mut self.measured, key, index);
        }
        for key in op.control_keys() {
            bump(&mut self.read, key, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::gate::{CustomGate, StandardGate};
    use num_complex::Complex64;

    fn q(i: i64) -> Qubit {
        Qubit::line(i)
    }

    fn op(gate: StandardGate, qubits: &[i64]) -> Operation {
        Operation::gate(gate, qubits.iter().map(|i| q(*i))).unwrap()
    }

    fn shape(program: &Program) -> Vec<usize> {
        program.moments().iter().map(Moment::len).collect()
    }

    #[test]
    fn test_earliest_packing() {
        let program = Program::from_content(
            [
                op(StandardGate::H, &[0]),
                op(StandardGate::H, &[1]),
                op(StandardGate::CX, &[0, 1]),
                op(StandardGate::X, &[2]),
            ],
            InsertStrategy::Earliest,
        );
        assert_eq!(shape(&program), vec![3, 1]);
        assert_eq!(program.operation_count(), 4);
    }

    #[test]
    fn test_earliest_respects_keys() {
        let program: Program = [
            Operation::measure([q(0)], "m").unwrap(),
            op(StandardGate::X, &[1]).with_classical_controls([Condition::key("m")]),
            Operation::measure([q(2)], "m").unwrap(),
        ]
        .into_iter()
        .collect();
        // The reader waits for the measurement, the second measurement waits
        // for the reader.
        assert_eq!(shape(&program), vec![1, 1, 1]);
    }

    #[test]
    fn test_moments_go_to_the_end() {
        let mut program = Program::new();
        program.append(op(StandardGate::X, &[0]));
        program.append(Moment::from_operations([op(StandardGate::Y, &[1])]).unwrap());
        program.append(op(StandardGate::Z, &[2]));
        // Z can still join the first moment.
        assert_eq!(shape(&program), vec![2, 1]);
    }

    #[test]
    fn test_global_phase_goes_first() {
        let program = Program::from_content(
            [
                op(StandardGate::X, &[0]),
                op(StandardGate::X, &[0]),
                op(StandardGate::global_phase(Complex64::new(-1.0, 0.0)), &[]),
            ],
            InsertStrategy::Earliest,
        );
        assert_eq!(shape(&program), vec![2, 1]);
    }

    #[test]
    fn test_other_strategies() {
        let ops = [
            op(StandardGate::H, &[0]),
            op(StandardGate::H, &[1]),
            op(StandardGate::X, &[0]),
            op(StandardGate::X, &[2]),
        ];
        assert_eq!(
            shape(&Program::from_content(ops.clone(), InsertStrategy::New)),
            vec![1, 1, 1, 1]
        );
        assert_eq!(
            shape(&Program::from_content(ops.clone(), InsertStrategy::Inline)),
            vec![2, 2]
        );

        let mut program = Program::from_content(ops.clone(), InsertStrategy::Inline);
        program.extend(
            [op(StandardGate::Y, &[5]), op(StandardGate::Y, &[6])],
            InsertStrategy::NewThenInline,
        );
        assert_eq!(shape(&program), vec![2, 2, 2]);
    }

    #[test]
    fn test_algebra() {
        let a = Program::from_content([op(StandardGate::S, &[0])], InsertStrategy::Earliest)
            .with_tags([Tag::name("a")]);
        let b = Program::from_content([op(StandardGate::T, &[1])], InsertStrategy::Earliest);

        let sum = &a + &b;
        assert_eq!(sum.num_moments(), 2);
        assert_eq!(sum.tags(), a.tags());

        assert_eq!((&a * 3).num_moments(), 3);
        assert!((&a * 0).is_empty());
        assert!((&a * -2).is_empty());

        let inv = a.pow(-1).unwrap();
        assert_eq!(inv.moments()[0].operations()[0], op(StandardGate::Sdg, &[0]));
        assert_eq!(a.pow(1), Some(a.clone()));
        assert_eq!(a.pow(2), None);

        let opaque = Program::from_content(
            [Operation::gate(CustomGate::new("u", 1), [q(0)]).unwrap()],
            InsertStrategy::Earliest,
        );
        assert_eq!(opaque.inverse(), None);
    }

    #[test]
    fn test_repeat_keeps_moment_order() {
        let program = Program::from_content(
            [op(StandardGate::H, &[0]), op(StandardGate::CZ, &[0, 1])],
            InsertStrategy::Earliest,
        );
        let repeated = program.repeat(2);

        assert_eq!(repeated.num_moments(), 4);
        assert_eq!(&repeated.moments()[..2], program.moments());
        assert_eq!(&repeated.moments()[2..], program.moments());
        assert_eq!(repeated.freeze(), program.freeze().repeat(2));
    }

    #[test]
    fn test_freeze_round_trip() {
        let program = Program::from_content(
            [op(StandardGate::H, &[0]), op(StandardGate::CZ, &[0, 1])],
            InsertStrategy::Earliest,
        )
        .with_tags([Tag::Int(1)]);
        assert_eq!(program.freeze().unfreeze(), program);
        assert_eq!(program.clone().into_frozen(), program.freeze());
    }
}
