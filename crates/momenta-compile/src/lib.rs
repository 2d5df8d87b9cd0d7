//! Momenta Pass Framework
//!
//! This crate provides the pass infrastructure for transforming Momenta
//! programs, and the commutation-guarded insertion sort built on it.
//!
//! # Overview
//!
//! A [`Pass`] transforms one flat program level. The [`PassManager`] runs a
//! sequence of passes, threading a [`PassContext`] through them. The context
//! decides whether passes also descend into sub-program calls and which
//! tagged calls to leave alone.
//!
//! ```text
//! Program ──► PassManager ◄── PassContext (deep, tags_to_ignore, results)
//!                 │
//!                 └── InsertionSort (Commutation predicate)
//!                 │
//!                 ▼
//!              Program
//! ```
//!
//! # Example: Sorting a Program
//!
//! ```rust
//! use momenta_compile::PassManagerBuilder;
//! use momenta_ir::{InsertStrategy, Operation, Program, Qubit, StandardGate};
//!
//! let cz = |a, b| Operation::gate(StandardGate::CZ, [Qubit::line(a), Qubit::line(b)]).unwrap();
//! let mut program = Program::from_content([cz(2, 1), cz(0, 1)], InsertStrategy::Earliest);
//!
//! let (pm, mut context) = PassManagerBuilder::new().build();
//! pm.run(&mut program, &mut context).unwrap();
//!
//! let order: Vec<_> = program.all_operations().map(|op| op.qubits().to_vec()).collect();
//! assert_eq!(order[0], vec![Qubit::line(0), Qubit::line(1)]);
//! ```
//!
//! # Custom Passes
//!
//! ```rust
//! use momenta_compile::{CompileResult, Pass, PassContext, PassKind};
//! use momenta_ir::Program;
//!
//! struct DropTags;
//!
//! impl Pass for DropTags {
//!     fn name(&self) -> &str { "drop_tags" }
//!     fn kind(&self) -> PassKind { PassKind::Transformation }
//!
//!     fn run(&self, program: &Program, _context: &mut PassContext) -> CompileResult<Program> {
//!         Ok(Program::from_moments(program.moments().to_vec(), Vec::new()))
//!     }
//! }
//! ```

pub mod commutation;
pub mod context;
pub mod error;
pub mod manager;
pub mod pass;

// Built-in passes
pub mod passes;

pub use commutation::{Commutation, RuleCommutation};
pub use context::PassContext;
pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use passes::{InsertionSort, SortStats};
