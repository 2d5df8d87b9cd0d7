//! Operations: gates, measurements and composite actions on qubits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::call::SubProgramCall;
use crate::condition::Condition;
use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::qubit::Qubit;
use crate::tag::Tag;

/// The kind of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// A quantum gate.
    Gate(Gate),
    /// Measurement of the operation's qubits into a key.
    Measure {
        /// The measurement key.
        key: String,
    },
    /// Reset to |0⟩.
    Reset,
    /// A call into a frozen sub-program.
    SubProgram(SubProgramCall),
    /// An operation executed only when all conditions hold.
    Controlled {
        /// The guarded operation.
        operation: Box<Operation>,
        /// Guard conditions, all of which must hold.
        conditions: Vec<Condition>,
    },
}

/// An atomic timed action on an ordered list of distinct qubits.
///
/// Operations are immutable: tags are fixed at construction and every
/// modifier returns a new operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "OperationRepr")]
pub struct Operation {
    kind: OperationKind,
    qubits: Vec<Qubit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<Tag>,
}

impl Operation {
    /// Create a gate operation.
    ///
    /// Fails if the qubit count does not match the gate's arity or if a
    /// qubit is repeated.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = Qubit>) -> IrResult<Self> {
        let gate = gate.into();
        let qubits: Vec<Qubit> = qubits.into_iter().collect();
        if qubits.len() != gate.num_qubits() as usize {
            return Err(IrError::QubitCountMismatch {
                gate_name: gate.name().to_string(),
                expected: gate.num_qubits(),
                got: qubits.len() as u32,
            });
        }
        check_distinct(&qubits, gate.name())?;
        Ok(Self {
            kind: OperationKind::Gate(gate),
            qubits,
            tags: vec![],
        })
    }

    /// Create a measurement of one or more qubits into `key`.
    pub fn measure(
        qubits: impl IntoIterator<Item = Qubit>,
        key: impl Into<String>,
    ) -> IrResult<Self> {
        let qubits: Vec<Qubit> = qubits.into_iter().collect();
        check_distinct(&qubits, "measure")?;
        Ok(Self {
            kind: OperationKind::Measure { key: key.into() },
            qubits,
            tags: vec![],
        })
    }

    /// Create a reset operation.
    pub fn reset(qubit: Qubit) -> Self {
        Self {
            kind: OperationKind::Reset,
            qubits: vec![qubit],
            tags: vec![],
        }
    }

    /// Wrap a sub-program call as an operation.
    ///
    /// The operation acts on the call's mapped qubits.
    pub fn sub_program(call: SubProgramCall) -> Self {
        Self {
            qubits: call.qubits(),
            kind: OperationKind::SubProgram(call),
            tags: vec![],
        }
    }

    /// The kind of this operation.
    #[inline]
    pub fn kind(&self) -> &OperationKind {
        &self.kind
    }

    /// The qubits this operation acts on, in operand order.
    #[inline]
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Tags attached to this operation.
    #[inline]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// A short name for display and error context.
    pub fn name(&self) -> String {
        match &self.kind {
            OperationKind::Gate(g) => g.name().to_string(),
            OperationKind::Measure { .. } => "measure".into(),
            OperationKind::Reset => "reset".into(),
            OperationKind::SubProgram(_) => "call".into(),
            OperationKind::Controlled { operation, .. } => format!("if({})", operation.name()),
        }
    }

    /// The gate, if this is a plain gate operation.
    pub fn as_gate(&self) -> Option<&Gate> {
        match &self.kind {
            OperationKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// The sub-program call, if this is a call operation.
    pub fn as_sub_program(&self) -> Option<&SubProgramCall> {
        match &self.kind {
            OperationKind::SubProgram(call) => Some(call),
            _ => None,
        }
    }

    /// Return a copy with `tags` appended after the existing tags.
    #[must_use]
    pub fn with_tags(&self, tags: impl IntoIterator<Item = Tag>) -> Self {
        let mut op = self.clone();
        op.tags.extend(tags);
        op
    }

    /// Return a copy without tags.
    #[must_use]
    pub fn untagged(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            qubits: self.qubits.clone(),
            tags: vec![],
        }
    }

    /// Check if any tag is in `tags`.
    pub fn has_any_tag(&self, tags: &[Tag]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }

    /// Guard this operation with classical conditions.
    ///
    /// An empty condition list returns the operation unchanged. Guarding an
    /// already guarded operation extends its condition list instead of
    /// nesting, keeping the existing conditions first.
    #[must_use]
    pub fn with_classical_controls(self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        let mut conditions: Vec<Condition> = conditions.into_iter().collect();
        if conditions.is_empty() {
            return self;
        }
        let qubits = self.qubits.clone();
        let kind = match self.kind {
            OperationKind::Controlled {
                operation,
                conditions: mut existing,
            } if self.tags.is_empty() => {
                existing.append(&mut conditions);
                OperationKind::Controlled {
                    operation,
                    conditions: existing,
                }
            }
            kind => OperationKind::Controlled {
                operation: Box::new(Self {
                    kind,
                    qubits: self.qubits,
                    tags: self.tags,
                }),
                conditions,
            },
        };
        Self {
            kind,
            qubits,
            tags: vec![],
        }
    }

    /// Guard conditions, if this operation is classically controlled.
    pub fn classical_controls(&self) -> &[Condition] {
        match &self.kind {
            OperationKind::Controlled { conditions, .. } => conditions,
            _ => &[],
        }
    }

    /// Check if this is a measurement.
    pub fn is_measurement(&self) -> bool {
        matches!(self.kind, OperationKind::Measure { .. })
    }

    /// Measurement keys written by this operation.
    pub fn measurement_keys(&self) -> BTreeSet<String> {
        match &self.kind {
            OperationKind::Measure { key } => BTreeSet::from([key.clone()]),
            OperationKind::SubProgram(call) => call.measurement_keys(),
            OperationKind::Controlled { operation, .. } => operation.measurement_keys(),
            OperationKind::Gate(_) | OperationKind::Reset => BTreeSet::new(),
        }
    }

    /// Measurement keys read by this operation.
    pub fn control_keys(&self) -> BTreeSet<String> {
        match &self.kind {
            OperationKind::Controlled {
                operation,
                conditions,
            } => {
                let mut keys = operation.control_keys();
                for condition in conditions {
                    keys.extend(condition.keys().into_iter().map(str::to_string));
                }
                keys
            }
            OperationKind::SubProgram(call) => call.control_keys(),
            OperationKind::Gate(_) | OperationKind::Measure { .. } | OperationKind::Reset => {
                BTreeSet::new()
            }
        }
    }

    /// Names of free parameters.
    pub fn parameter_names(&self) -> BTreeSet<String> {
        match &self.kind {
            OperationKind::Gate(g) => g
                .parameters()
                .into_iter()
                .flat_map(|p| p.parameter_names())
                .collect(),
            OperationKind::SubProgram(call) => call.parameter_names(),
            OperationKind::Controlled { operation, .. } => operation.parameter_names(),
            OperationKind::Measure { .. } | OperationKind::Reset => BTreeSet::new(),
        }
    }

    /// Check if this operation has free parameters.
    pub fn is_parameterized(&self) -> bool {
        !self.parameter_names().is_empty()
    }

    /// Check if this operation applies a unitary.
    pub fn has_unitary(&self) -> bool {
        match &self.kind {
            OperationKind::Gate(_) => true,
            OperationKind::SubProgram(call) => call.has_unitary(),
            OperationKind::Measure { .. }
            | OperationKind::Reset
            | OperationKind::Controlled { .. } => false,
        }
    }

    /// Check if this is a gate known to be diagonal.
    pub fn is_diagonal(&self) -> bool {
        self.as_gate().is_some_and(Gate::is_diagonal)
    }

    /// The inverse operation, if one exists. Tags are kept.
    pub fn inverse(&self) -> Option<Self> {
        match &self.kind {
            OperationKind::Gate(g) => Some(Self {
                kind: OperationKind::Gate(g.inverse()?),
                qubits: self.qubits.clone(),
                tags: self.tags.clone(),
            }),
            OperationKind::SubProgram(call) => {
                Some(Self::sub_program(call.inverse()?).with_tags(self.tags.iter().cloned()))
            }
            OperationKind::Measure { .. }
            | OperationKind::Reset
            | OperationKind::Controlled { .. } => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qubits = self
            .qubits
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        match &self.kind {
            OperationKind::Gate(g) => {
                let params = g.parameters();
                if params.is_empty() {
                    write!(f, "{}({qubits})", g.name())?;
                } else {
                    let params = params
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, "{}[{params}]({qubits})", g.name())?;
                }
            }
            OperationKind::Measure { key } => write!(f, "measure[{key:?}]({qubits})")?,
            OperationKind::Reset => write!(f, "reset({qubits})")?,
            OperationKind::SubProgram(call) => write!(f, "{call}")?,
            OperationKind::Controlled {
                operation,
                conditions,
            } => {
                let conditions = conditions
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{operation}.if({conditions})")?;
            }
        }
        if !self.tags.is_empty() {
            let tags = self
                .tags
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "[{tags}]")?;
        }
        Ok(())
    }
}

fn check_distinct(qubits: &[Qubit], op_name: &str) -> IrResult<()> {
    let mut seen = BTreeSet::new();
    for qubit in qubits {
        if !seen.insert(qubit) {
            return Err(IrError::DuplicateQubit {
                qubit: qubit.clone(),
                op_name: Some(op_name.to_string()),
            });
        }
    }
    Ok(())
}

/// Unvalidated form read from persisted data.
#[derive(Deserialize)]
struct OperationRepr {
    kind: OperationKind,
    qubits: Vec<Qubit>,
    #[serde(default)]
    tags: Vec<Tag>,
}

impl TryFrom<OperationRepr> for Operation {
    type Error = IrError;

    fn try_from(repr: OperationRepr) -> IrResult<Self> {
        let op = match repr.kind {
            OperationKind::Gate(gate) => Operation::gate(gate, repr.qubits)?,
            OperationKind::SubProgram(call) => Operation::sub_program(call),
            kind => {
                check_distinct(&repr.qubits, "operation")?;
                Operation {
                    kind,
                    qubits: repr.qubits,
                    tags: vec![],
                }
            }
        };
        Ok(op.with_tags(repr.tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Comparator;
    use crate::gate::StandardGate;
    use crate::parameter::ParameterExpression;

    fn q(i: i64) -> Qubit {
        Qubit::line(i)
    }

    #[test]
    fn test_gate_validation() {
        assert!(Operation::gate(StandardGate::CZ, [q(0), q(1)]).is_ok());
        assert!(matches!(
            Operation::gate(StandardGate::CZ, [q(0)]),
            Err(IrError::QubitCountMismatch { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            Operation::gate(StandardGate::CZ, [q(3), q(3)]),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert!(matches!(
            Operation::measure([q(0), q(0)], "m"),
            Err(IrError::DuplicateQubit { .. })
        ));
    }

    #[test]
    fn test_with_tags_appends() {
        let op = Operation::gate(StandardGate::X, [q(0)]).unwrap();
        let tagged = op.with_tags([Tag::name("a")]).with_tags([Tag::name("a"), Tag::Int(1)]);
        assert_eq!(tagged.tags(), &[Tag::name("a"), Tag::name("a"), Tag::Int(1)]);
        assert!(op.tags().is_empty());
        assert_ne!(op, tagged);
        assert_eq!(tagged.untagged(), op);
    }

    #[test]
    fn test_classical_controls_flatten() {
        let op = Operation::gate(StandardGate::X, [q(1)]).unwrap();
        assert_eq!(op.clone().with_classical_controls([]), op);

        let once = op.clone().with_classical_controls([Condition::key("a")]);
        let twice = once
            .clone()
            .with_classical_controls([Condition::compare("b", Comparator::Eq, 1)]);

        assert_eq!(once.qubits(), op.qubits());
        assert_eq!(
            twice.classical_controls(),
            &[
                Condition::key("a"),
                Condition::compare("b", Comparator::Eq, 1)
            ]
        );
        let OperationKind::Controlled { operation, .. } = twice.kind() else {
            panic!("Expected a controlled operation");
        };
        assert_eq!(**operation, op);
        assert_eq!(
            twice.control_keys(),
            BTreeSet::from(["a".to_string(), "b".to_string()])
        );
        assert!(!twice.has_unitary());
    }

    #[test]
    fn test_derived_queries() {
        let m = Operation::measure([q(0), q(1)], "result").unwrap();
        assert!(m.is_measurement());
        assert_eq!(m.measurement_keys(), BTreeSet::from(["result".to_string()]));
        assert!(!m.has_unitary());
        assert!(m.inverse().is_none());

        let rz = Operation::gate(StandardGate::Rz(ParameterExpression::symbol("t")), [q(0)])
            .unwrap()
            .with_tags([Tag::Int(4)]);
        assert!(rz.is_parameterized());
        assert!(rz.is_diagonal());
        let inv = rz.inverse().unwrap();
        assert_eq!(inv.tags(), &[Tag::Int(4)]);
        assert_eq!(
            inv.as_gate(),
            Some(&Gate::Standard(StandardGate::Rz(
                ParameterExpression::symbol("t").negated()
            )))
        );
    }

    #[test]
    fn test_display() {
        let op = Operation::gate(StandardGate::CZ, [q(2), q(1)]).unwrap();
        assert_eq!(op.to_string(), "cz(q(2), q(1))");
        let m = Operation::measure([q(0)], "m")
            .unwrap()
            .with_classical_controls([Condition::key("c")]);
        assert_eq!(m.to_string(), "measure[\"m\"](q(0)).if(c)");
    }

    #[test]
    fn test_serde_revalidates() {
        let op = Operation::gate(StandardGate::H, [q(0)])
            .unwrap()
            .with_tags([Tag::name("x")]);
        let json = serde_json::to_string(&op).unwrap();
        let back: Operation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);

        let bad = json.replace(r#"[{"Line":0}]"#, r#"[{"Line":0},{"Line":1}]"#);
        assert!(serde_json::from_str::<Operation>(&bad).is_err());
    }
}
