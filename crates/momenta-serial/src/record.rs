//! Field-level records, already parsed from the wire.
//!
//! Qubits appear as textual ids (see [`Qubit::proto_id`]) and constants are
//! referenced by their position in a [`ConstantTable`](crate::ConstantTable).

use serde::{Deserialize, Serialize};

use momenta_ir::{Comparator, Condition, Qubit, Tag};

use crate::arg::ArgRecord;
use crate::error::{SerialError, SerialResult};

/// How many times, and under which ids, a sub-program repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepetitionSpec {
    Count(i64),
    Ids(Vec<String>),
}

/// A classical condition descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionRecord {
    /// True when the measured value under `key` is non-zero.
    Key(String),
    /// Compares the measured value under `key` against `value`.
    Compare {
        key: String,
        comparator: String,
        value: i64,
    },
}

impl ConditionRecord {
    /// Decode into a [`Condition`].
    pub fn decode(&self) -> SerialResult<Condition> {
        match self {
            ConditionRecord::Key(key) => Ok(Condition::key(non_empty(key)?)),
            ConditionRecord::Compare {
                key,
                comparator,
                value,
            } => {
                let comparator = match comparator.as_str() {
                    "==" => Comparator::Eq,
                    "!=" => Comparator::Ne,
                    "<" => Comparator::Lt,
                    "<=" => Comparator::Le,
                    ">" => Comparator::Gt,
                    ">=" => Comparator::Ge,
                    other => {
                        return Err(SerialError::InvalidCondition(format!(
                            "unknown comparator '{other}'"
                        )));
                    }
                };
                Ok(Condition::compare(non_empty(key)?, comparator, *value))
            }
        }
    }
}

fn non_empty(key: &str) -> SerialResult<&str> {
    if key.is_empty() {
        return Err(SerialError::InvalidCondition("empty measurement key".into()));
    }
    Ok(key)
}

/// A serialized sub-program call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubProgramCallRecord {
    /// Index of the called program in the constant table.
    pub constant_index: usize,
    /// Absent means a single repetition without ids.
    pub repetition_specification: Option<RepetitionSpec>,
    /// Qubit id pairs, inner to outer.
    pub operand_map: Vec<(String, String)>,
    /// Measurement key pairs, inner to outer.
    pub label_map: Vec<(String, String)>,
    /// Encoded parameter bindings.
    pub param_map: Vec<(ArgRecord, ArgRecord)>,
    pub repeat_until: Option<ConditionRecord>,
    /// Guard conditions, in order.
    pub conditioned_on: Vec<ConditionRecord>,
    pub use_explicit_identifiers: bool,
}

impl SubProgramCallRecord {
    /// A record calling the constant at `constant_index` once.
    pub fn new(constant_index: usize) -> Self {
        Self {
            constant_index,
            ..Self::default()
        }
    }

    /// The repetition count and explicit ids this record describes.
    pub fn repetitions(&self) -> (i64, Option<&[String]>) {
        match &self.repetition_specification {
            Some(RepetitionSpec::Count(count)) => (*count, None),
            Some(RepetitionSpec::Ids(ids)) => (ids.len() as i64, Some(ids.as_slice())),
            None => (1, None),
        }
    }
}

/// A gate applied to qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateRecord {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ArgRecord>,
    pub qubits: Vec<String>,
}

/// A measurement of qubits into a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureRecord {
    pub key: String,
    pub qubits: Vec<String>,
}

/// The closed set of operation record kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Gate(GateRecord),
    Measure(MeasureRecord),
    Reset { qubit: String },
    SubProgramCall(SubProgramCallRecord),
}

/// A serialized operation with its tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub kind: RecordKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl OperationRecord {
    /// Attach tags to this record.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }
}

impl From<RecordKind> for OperationRecord {
    fn from(kind: RecordKind) -> Self {
        Self { kind, tags: vec![] }
    }
}

impl From<GateRecord> for OperationRecord {
    fn from(record: GateRecord) -> Self {
        RecordKind::Gate(record).into()
    }
}

impl From<MeasureRecord> for OperationRecord {
    fn from(record: MeasureRecord) -> Self {
        RecordKind::Measure(record).into()
    }
}

impl From<SubProgramCallRecord> for OperationRecord {
    fn from(record: SubProgramCallRecord) -> Self {
        RecordKind::SubProgramCall(record).into()
    }
}

/// A program as a list of moments of operation records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub moments: Vec<Vec<OperationRecord>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl ProgramRecord {
    /// Constant indices referenced by calls in this program.
    pub fn references(&self) -> impl Iterator<Item = usize> + '_ {
        self.moments.iter().flatten().filter_map(|op| match &op.kind {
            RecordKind::SubProgramCall(call) => Some(call.constant_index),
            RecordKind::Gate(_) | RecordKind::Measure(_) | RecordKind::Reset { .. } => None,
        })
    }
}

/// One entry of a serialized constant table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantRecord {
    Text(String),
    QubitId(String),
    Program(ProgramRecord),
}

impl ConstantRecord {
    /// A qubit constant.
    pub fn qubit(qubit: &Qubit) -> Self {
        ConstantRecord::QubitId(qubit.proto_id())
    }

    /// Constant indices this entry refers to.
    pub fn references(&self) -> Vec<usize> {
        match self {
            ConstantRecord::Program(program) => program.references().collect(),
            ConstantRecord::Text(_) | ConstantRecord::QubitId(_) => Vec::new(),
        }
    }
}
