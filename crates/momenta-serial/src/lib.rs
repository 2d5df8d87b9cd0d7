//! Momenta Serialization
//!
//! Rebuilds Momenta programs from field-level records that reference a
//! [`ConstantTable`] of previously decoded constants, and persists frozen
//! programs as JSON.
//!
//! # Decoding
//!
//! A serialized table is resolved bottom-up with [`ConstantTable::resolve`]:
//! each entry can only refer to entries before it. Records are then decoded
//! against the finished table, one at a time with [`deserialize_operation`]
//! or in parallel with [`deserialize_batch`].
//!
//! ```rust
//! use momenta_ir::{FrozenProgram, InsertStrategy, Operation, Qubit, StandardGate};
//! use momenta_serial::{
//!     deserialize_operation, ConstantTable, OperationRecord, RepetitionSpec, SubProgramCallRecord,
//! };
//!
//! let mut table = ConstantTable::new();
//! table.push(FrozenProgram::new(
//!     [Operation::gate(StandardGate::X, [Qubit::line(0)]).unwrap()],
//!     InsertStrategy::Earliest,
//! ));
//!
//! let mut record = SubProgramCallRecord::new(0);
//! record.repetition_specification = Some(RepetitionSpec::Count(3));
//!
//! let op = deserialize_operation(&OperationRecord::from(record), &table).unwrap();
//! assert_eq!(op.as_sub_program().map(|call| call.repetitions()), Some(3));
//! ```
//!
//! # Persistence
//!
//! [`to_json`] and [`from_json`] store only moments and tags. Tags must be
//! names or integers to be persisted.

pub mod arg;
pub mod batch;
pub mod constant;
pub mod deserializer;
pub mod error;
pub mod persist;
pub mod record;

pub use arg::{Arg, ArgRecord};
pub use batch::deserialize_batch;
pub use constant::{Constant, ConstantTable};
pub use deserializer::{deserialize_operation, deserialize_program, deserialize_sub_program_call};
pub use error::{SerialError, SerialResult};
pub use persist::{from_json, to_json};
pub use record::{
    ConditionRecord, ConstantRecord, GateRecord, MeasureRecord, OperationRecord, ProgramRecord,
    RecordKind, RepetitionSpec, SubProgramCallRecord,
};
