//! [`PassContext`]: settings and shared state for pass execution.
//!
//! The context carries the invocation settings that apply to every pass
//! (whether to descend into sub-program calls, which tagged operations to
//! leave alone) and a type-erased store through which passes report results.
//!
//! # Example
//!
//! ```
//! use momenta_compile::PassContext;
//! use momenta_ir::Tag;
//!
//! #[derive(Debug, PartialEq)]
//! struct Visited(usize);
//!
//! let mut context = PassContext::new()
//!     .with_deep(true)
//!     .with_tags_to_ignore([Tag::name("frozen")]);
//! context.insert(Visited(3));
//!
//! assert!(context.deep());
//! assert_eq!(context.get::<Visited>(), Some(&Visited(3)));
//! ```

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};

use momenta_ir::{Operation, Tag};

/// Shared context passed through every pass.
#[derive(Debug, Default)]
pub struct PassContext {
    deep: bool,
    tags_to_ignore: Vec<Tag>,
    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PassContext {
    /// Create a context that only transforms the top level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also transform the programs inside sub-program calls.
    #[must_use]
    pub fn with_deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    /// Leave sub-program calls carrying any of these tags untouched.
    #[must_use]
    pub fn with_tags_to_ignore(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags_to_ignore.extend(tags);
        self
    }

    /// Whether passes descend into sub-program calls.
    pub fn deep(&self) -> bool {
        self.deep
    }

    /// Tags marking operations to skip.
    pub fn tags_to_ignore(&self) -> &[Tag] {
        &self.tags_to_ignore
    }

    /// Check if an operation is marked to be skipped.
    pub fn ignores(&self, op: &Operation) -> bool {
        op.has_any_tag(&self.tags_to_ignore)
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }
}
