//! JSON persistence for frozen programs.
//!
//! The persisted form holds moments and tags only. Derived values such as
//! the structural hash are recomputed after loading.

use momenta_ir::{FrozenProgram, Operation, OperationKind, Tag};

use crate::error::{SerialError, SerialResult};

/// Persist a program as JSON.
///
/// Fails with [`SerialError::NonPersistableTag`] if the program, or any
/// operation or sub-program inside it, carries an opaque tag.
pub fn to_json(program: &FrozenProgram) -> SerialResult<String> {
    check_program(program)?;
    Ok(serde_json::to_string(program)?)
}

/// Load a program persisted with [`to_json`].
pub fn from_json(json: &str) -> SerialResult<FrozenProgram> {
    Ok(serde_json::from_str(json)?)
}

fn check_tags(tags: &[Tag]) -> SerialResult<()> {
    match tags.iter().find(|tag| !tag.is_persistable()) {
        Some(tag) => Err(SerialError::NonPersistableTag {
            tag: tag.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_program(program: &FrozenProgram) -> SerialResult<()> {
    check_tags(program.tags())?;
    program.all_operations().try_for_each(check_operation)
}

fn check_operation(op: &Operation) -> SerialResult<()> {
    check_tags(op.tags())?;
    match op.kind() {
        OperationKind::SubProgram(call) => check_program(call.program()),
        OperationKind::Controlled { operation, .. } => check_operation(operation),
        OperationKind::Gate(_) | OperationKind::Measure { .. } | OperationKind::Reset => Ok(()),
    }
}
