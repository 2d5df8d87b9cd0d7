//! Momenta Program Intermediate Representation
//!
//! This crate provides the moment-based representation of quantum programs
//! used throughout Momenta.
//!
//! # Overview
//!
//! A program is an ordered sequence of [`Moment`]s. Each moment is a
//! time-slice holding [`Operation`]s that act on pairwise disjoint
//! [`Qubit`]s. [`Program`] is the mutable builder; [`FrozenProgram`] is the
//! immutable form with structural hashing and memoized derived queries, and
//! it is cheap to share across threads.
//!
//! # Core Components
//!
//! - **Qubits**: [`Qubit`] line, grid and named operands with a total order
//! - **Gates**: [`StandardGate`] for built-in gates and [`CustomGate`] for
//!   user-defined ones
//! - **Parameters**: [`ParameterExpression`] and [`ParamMap`] bindings
//! - **Operations**: [`Operation`] and [`OperationKind`], including classical
//!   control through [`Condition`]
//! - **Sub-programs**: [`SubProgramCall`] invokes a [`FrozenProgram`] with
//!   repetition, remapping and a termination condition
//! - **Tags**: [`Tag`] metadata on operations and programs
//!
//! # Example: Building and Freezing a Program
//!
//! ```rust
//! use momenta_ir::{FrozenProgram, InsertStrategy, Operation, Qubit, StandardGate};
//!
//! let (a, b) = (Qubit::line(0), Qubit::line(1));
//! let program = FrozenProgram::new(
//!     [
//!         Operation::gate(StandardGate::H, [a.clone()]).unwrap(),
//!         Operation::gate(StandardGate::CX, [a.clone(), b.clone()]).unwrap(),
//!         Operation::measure([a, b], "m").unwrap(),
//!     ],
//!     InsertStrategy::Earliest,
//! );
//!
//! assert_eq!(program.num_moments(), 3);
//! assert_eq!(program.qubits().len(), 2);
//! assert_eq!(program.unfreeze().freeze(), program);
//! ```
//!
//! # Example: Calling a Sub-program
//!
//! ```rust
//! use momenta_ir::{FrozenProgram, InsertStrategy, Operation, Qubit, StandardGate, SubProgramCall};
//!
//! let inner = FrozenProgram::new(
//!     [Operation::gate(StandardGate::X, [Qubit::line(0)]).unwrap()],
//!     InsertStrategy::Earliest,
//! );
//! let call = SubProgramCall::builder(inner).repetitions(3).build().unwrap();
//! let op = Operation::sub_program(call);
//!
//! assert!(op.has_unitary());
//! ```

pub mod analysis;
pub mod call;
pub mod condition;
pub mod error;
mod float;
pub mod frozen;
pub mod gate;
pub mod moment;
pub mod operation;
pub mod parameter;
pub mod program;
pub mod qubit;
pub mod tag;

pub use call::{SubProgramCall, SubProgramCallBuilder};
pub use condition::{Comparator, Condition};
pub use error::{IrError, IrResult};
pub use frozen::FrozenProgram;
pub use gate::{Coefficient, CustomGate, Gate, StandardGate};
pub use moment::Moment;
pub use operation::{Operation, OperationKind};
pub use parameter::{ParamKey, ParamMap, ParamValue, ParameterExpression, Symbol};
pub use program::{Content, InsertStrategy, Program};
pub use qubit::Qubit;
pub use tag::{OpaqueTag, Tag, TagValue};
