//! Pass trait and types for program transforms.

use tracing::debug;

use momenta_ir::{Moment, Operation, Program};

use crate::context::PassContext;
use crate::error::{CompileError, CompileResult};

/// The kind of pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads the program and writes to the context.
    Analysis,
    /// Transformation pass that produces a new program.
    Transformation,
}

/// A pass over one flat program level.
///
/// [`run`](Pass::run) never looks inside sub-program calls. Descending into
/// them is handled by [`apply`](Pass::apply) according to
/// [`PassContext::deep`].
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on a single program level.
    fn run(&self, program: &Program, context: &mut PassContext) -> CompileResult<Program>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _program: &Program, _context: &PassContext) -> bool {
        true
    }

    /// Run the pass, first on nested sub-programs when the context is deep.
    ///
    /// Calls tagged with one of the context's ignored tags keep their
    /// program unchanged.
    fn apply(&self, program: &Program, context: &mut PassContext) -> CompileResult<Program> {
        if !context.deep() {
            return self.run(program, context);
        }

        let mut moments = Vec::with_capacity(program.num_moments());
        for moment in program.moments() {
            let mut operations = Vec::with_capacity(moment.len());
            for op in moment.operations() {
                operations.push(self.apply_nested(op, context)?);
            }
            moments.push(Moment::from_operations(operations)?);
        }
        let program = Program::from_moments(moments, program.tags().to_vec());
        self.run(&program, context)
    }

    /// Transform the program inside a sub-program call operation.
    fn apply_nested(&self, op: &Operation, context: &mut PassContext) -> CompileResult<Operation> {
        let Some(call) = op.as_sub_program() else {
            return Ok(op.clone());
        };
        if context.ignores(op) {
            debug!("{}: skipping ignored call {}", self.name(), op);
            return Ok(op.clone());
        }

        let inner = self.apply(&call.program().unfreeze(), context)?;
        let call = call
            .with_program(inner.into_frozen())
            .map_err(|e| CompileError::PassFailed {
                name: self.name().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Operation::sub_program(call).with_tags(op.tags().iter().cloned()))
    }
}
