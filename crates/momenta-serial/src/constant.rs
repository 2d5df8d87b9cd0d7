//! The constant table: previously decoded entities referenced by position.

use petgraph::graph::DiGraph;
use tracing::{debug, instrument};

use momenta_ir::{FrozenProgram, Qubit};

use crate::deserializer::deserialize_program;
use crate::error::{SerialError, SerialResult};
use crate::record::ConstantRecord;

/// A decoded constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Text(String),
    Qubit(Qubit),
    Program(FrozenProgram),
}

impl Constant {
    /// Short name of this constant's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Constant::Text(_) => "text",
            Constant::Qubit(_) => "qubit",
            Constant::Program(_) => "program",
        }
    }
}

impl From<FrozenProgram> for Constant {
    fn from(program: FrozenProgram) -> Self {
        Constant::Program(program)
    }
}

impl From<Qubit> for Constant {
    fn from(qubit: Qubit) -> Self {
        Constant::Qubit(qubit)
    }
}

/// Ordered, already decoded constants.
///
/// Entries are only ever appended, so an entry can refer to any entry
/// before it. Lookups past the end fail with
/// [`SerialError::IndexOutOfRange`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantTable {
    entries: Vec<Constant>,
}

impl ConstantTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoded constant, returning its index.
    pub fn push(&mut self, constant: impl Into<Constant>) -> usize {
        self.entries.push(constant.into());
        self.entries.len() - 1
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in index order.
    pub fn entries(&self) -> &[Constant] {
        &self.entries
    }

    /// Look up an entry.
    pub fn get(&self, index: usize) -> SerialResult<&Constant> {
        self.entries
            .get(index)
            .ok_or(SerialError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Look up an entry that must be a program.
    pub fn program(&self, index: usize) -> SerialResult<&FrozenProgram> {
        match self.get(index)? {
            Constant::Program(program) => Ok(program),
            other => Err(SerialError::TypeMismatch {
                index,
                expected: "program",
                actual: other.kind(),
            }),
        }
    }

    /// Decode a serialized table bottom-up.
    ///
    /// Entry `i` is decoded with entries `0..i` visible. Reference cycles are
    /// rejected up front; forward references fail as out of range when the
    /// referring entry is decoded.
    #[instrument(skip(records), fields(len = records.len()))]
    pub fn resolve(records: &[ConstantRecord]) -> SerialResult<Self> {
        check_acyclic(records)?;

        let mut table = Self::new();
        for record in records {
            let constant = match record {
                ConstantRecord::Text(text) => Constant::Text(text.clone()),
                ConstantRecord::QubitId(id) => Constant::Qubit(Qubit::from_proto_id(id)),
                ConstantRecord::Program(program) => {
                    Constant::Program(deserialize_program(program, &table)?)
                }
            };
            debug!("Resolved constant {} as {}", table.len(), constant.kind());
            table.push(constant);
        }
        Ok(table)
    }
}

fn check_acyclic(records: &[ConstantRecord]) -> SerialResult<()> {
    let mut graph = DiGraph::<usize, ()>::with_capacity(records.len(), 0);
    let nodes: Vec<_> = (0..records.len()).map(|i| graph.add_node(i)).collect();
    for (from, record) in records.iter().enumerate() {
        for to in record.references() {
            // Dangling references are reported during decoding.
            if let Some(&target) = nodes.get(to) {
                graph.add_edge(nodes[from], target, ());
            }
        }
    }

    match petgraph::algo::toposort(&graph, None) {
        Ok(_) => Ok(()),
        Err(cycle) => Err(SerialError::CyclicReference {
            index: graph[cycle.node_id()],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ProgramRecord, SubProgramCallRecord};

    fn calling(index: usize) -> ConstantRecord {
        ConstantRecord::Program(ProgramRecord {
            moments: vec![vec![SubProgramCallRecord::new(index).into()]],
            tags: vec![],
        })
    }

    #[test]
    fn test_lookup_errors() {
        let mut table = ConstantTable::new();
        table.push(Qubit::line(0));
        table.push(FrozenProgram::default());

        assert!(table.program(1).is_ok());
        assert!(matches!(
            table.program(0),
            Err(SerialError::TypeMismatch {
                index: 0,
                actual: "qubit",
                ..
            })
        ));
        assert!(matches!(
            table.program(5),
            Err(SerialError::IndexOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn test_resolve_bottom_up() {
        let records = vec![
            ConstantRecord::Text("hello".into()),
            ConstantRecord::Program(ProgramRecord::default()),
            calling(1),
        ];
        let table = ConstantTable::resolve(&records).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0).unwrap(), &Constant::Text("hello".into()));

        let outer = table.program(2).unwrap();
        assert_eq!(outer.operation_count(), 1);
        let call = outer.all_operations().next().and_then(|op| op.as_sub_program());
        assert_eq!(call.map(|c| c.program()), Some(table.program(1).unwrap()));
    }

    #[test]
    fn test_resolve_rejects_cycles() {
        assert!(matches!(
            ConstantTable::resolve(&[calling(0)]),
            Err(SerialError::CyclicReference { index: 0 })
        ));
        assert!(matches!(
            ConstantTable::resolve(&[calling(1), calling(0)]),
            Err(SerialError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_resolve_forward_reference() {
        let records = vec![calling(1), ConstantRecord::Program(ProgramRecord::default())];
        assert!(matches!(
            ConstantTable::resolve(&records),
            Err(SerialError::IndexOutOfRange { index: 1, len: 0 })
        ));
    }
}
