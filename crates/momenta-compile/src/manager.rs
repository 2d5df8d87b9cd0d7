//! Pass manager for running a sequence of passes.

use tracing::{debug, info, instrument};

use momenta_ir::{Program, Tag};

use crate::context::PassContext;
use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::InsertionSort;

/// Manages and executes a sequence of passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given program, replacing it with the result.
    #[instrument(skip(self, program, context))]
    pub fn run(&self, program: &mut Program, context: &mut PassContext) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on program with {} moments",
            self.passes.len(),
            program.num_moments()
        );

        for pass in &self.passes {
            if pass.should_run(program, context) {
                debug!("Running pass: {}", pass.name());
                *program = pass.apply(program, context)?;
                debug!(
                    "Pass {} completed, moments: {}",
                    pass.name(),
                    program.num_moments()
                );
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, moments: {}, ops: {}",
            program.num_moments(),
            program.operation_count()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a pass manager and its context.
pub struct PassManagerBuilder {
    sort: bool,
    context: PassContext,
}

impl PassManagerBuilder {
    /// Create a builder that sorts operations at the top level only.
    pub fn new() -> Self {
        Self {
            sort: true,
            context: PassContext::new(),
        }
    }

    /// Enable or disable the commutation-guarded insertion sort.
    #[must_use]
    pub fn with_insertion_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Descend into sub-program calls.
    #[must_use]
    pub fn with_deep(mut self, deep: bool) -> Self {
        self.context = self.context.with_deep(deep);
        self
    }

    /// Leave sub-program calls carrying any of these tags untouched.
    #[must_use]
    pub fn with_tags_to_ignore(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.context = self.context.with_tags_to_ignore(tags);
        self
    }

    /// Build the pass manager and return it with the context.
    pub fn build(self) -> (PassManager, PassContext) {
        let mut pm = PassManager::new();
        if self.sort {
            pm.add_pass(InsertionSort::new());
        }
        (pm, self.context)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
