//! Immutable programs with memoized derived queries.

use rustc_hash::FxHasher;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul};
use std::sync::{Arc, OnceLock};

use crate::analysis;
use crate::moment::Moment;
use crate::operation::Operation;
use crate::program::{Content, InsertStrategy, Program, fmt_moments};
use crate::qubit::Qubit;
use crate::tag::Tag;

/// An immutable program.
///
/// Cloning is cheap and shares the instance, including its memoized
/// queries. The moment sequence is shared with any program derived through
/// [`with_tags`](Self::with_tags). Equality and hashing look only at the
/// moments and tags; cached values never take part in comparison or
/// persistence.
#[derive(Clone)]
pub struct FrozenProgram {
    inner: Arc<Inner>,
}

struct Inner {
    moments: Arc<[Moment]>,
    tags: Vec<Tag>,
    cache: Derived,
}

/// Values computed on first use.
///
/// Racing first uses may compute a value twice; both results are equal and
/// the first write wins.
#[derive(Default)]
struct Derived {
    hash: OnceLock<u64>,
    qubits: OnceLock<BTreeSet<Qubit>>,
    operation_count: OnceLock<usize>,
    measurement_keys: OnceLock<BTreeSet<String>>,
    control_keys: OnceLock<BTreeSet<String>>,
    parameter_names: OnceLock<BTreeSet<String>>,
    has_unitary: OnceLock<bool>,
    has_measurements: OnceLock<bool>,
    terminal_measurements: OnceLock<bool>,
}

/// Return the cached value, computing it outside the cell on first use.
fn memoized<T>(cell: &OnceLock<T>, compute: impl FnOnce() -> T) -> &T {
    if let Some(value) = cell.get() {
        return value;
    }
    let value = compute();
    cell.get_or_init(|| value)
}

impl FrozenProgram {
    /// Pack content items into moments with `strategy` and freeze the result.
    pub fn new<I, C>(items: I, strategy: InsertStrategy) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Content>,
    {
        Program::from_content(items, strategy).into_frozen()
    }

    /// Freeze exactly these moments and tags.
    pub fn from_moments(moments: impl Into<Arc<[Moment]>>, tags: Vec<Tag>) -> Self {
        Self {
            inner: Arc::new(Inner {
                moments: moments.into(),
                tags,
                cache: Derived::default(),
            }),
        }
    }

    /// The moments of this program.
    #[inline]
    pub fn moments(&self) -> &[Moment] {
        &self.inner.moments
    }

    /// Tags attached to the program.
    #[inline]
    pub fn tags(&self) -> &[Tag] {
        &self.inner.tags
    }

    /// Number of moments.
    #[inline]
    pub fn num_moments(&self) -> usize {
        self.inner.moments.len()
    }

    /// Check if the program has no moments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.moments.is_empty()
    }

    /// Check if two handles share the same moment storage.
    pub fn shares_moments_with(&self, other: &FrozenProgram) -> bool {
        Arc::ptr_eq(&self.inner.moments, &other.inner.moments)
    }

    /// Already frozen; returns a handle to the same instance.
    pub fn freeze(&self) -> Self {
        self.clone()
    }

    /// A mutable program holding the same moments and tags.
    pub fn unfreeze(&self) -> Program {
        Program::from_moments(self.inner.moments.iter().cloned(), self.inner.tags.clone())
    }

    /// Append tags.
    ///
    /// With no new tags this returns the same instance. Otherwise the result
    /// has the existing tags followed by the new ones and shares this
    /// program's moments.
    #[must_use]
    pub fn with_tags(&self, tags: impl IntoIterator<Item = Tag>) -> Self {
        let mut tags = tags.into_iter().peekable();
        if tags.peek().is_none() {
            return self.clone();
        }
        Self {
            inner: Arc::new(Inner {
                moments: Arc::clone(&self.inner.moments),
                tags: self.inner.tags.iter().cloned().chain(tags).collect(),
                cache: Derived::default(),
            }),
        }
    }

    /// Return a program with the same moments and no tags.
    #[must_use]
    pub fn untagged(&self) -> Self {
        if self.inner.tags.is_empty() {
            return self.clone();
        }
        Self::from_moments(Arc::clone(&self.inner.moments), vec![])
    }

    /// All operations in time order.
    pub fn all_operations(&self) -> impl Iterator<Item = &Operation> {
        analysis::all_operations(&self.inner.moments)
    }

    /// Structural hash of the moments and tags, memoized.
    pub fn structural_hash(&self) -> u64 {
        *memoized(&self.inner.cache.hash, || {
            let mut hasher = FxHasher::default();
            self.inner.moments.hash(&mut hasher);
            self.inner.tags.hash(&mut hasher);
            hasher.finish()
        })
    }

    /// Every qubit acted on.
    pub fn qubits(&self) -> &BTreeSet<Qubit> {
        memoized(&self.inner.cache.qubits, || {
            analysis::qubits(&self.inner.moments)
        })
    }

    /// Total number of operations.
    pub fn operation_count(&self) -> usize {
        *memoized(&self.inner.cache.operation_count, || {
            analysis::operation_count(&self.inner.moments)
        })
    }

    /// Measurement keys written by the program.
    pub fn measurement_keys(&self) -> &BTreeSet<String> {
        memoized(&self.inner.cache.measurement_keys, || {
            analysis::measurement_keys(&self.inner.moments)
        })
    }

    /// Keys read but never measured inside the program.
    pub fn control_keys(&self) -> &BTreeSet<String> {
        memoized(&self.inner.cache.control_keys, || {
            analysis::control_keys(&self.inner.moments)
        })
    }

    /// Names of free parameters.
    pub fn parameter_names(&self) -> &BTreeSet<String> {
        memoized(&self.inner.cache.parameter_names, || {
            analysis::parameter_names(&self.inner.moments)
        })
    }

    /// Check if the program has free parameters.
    pub fn is_parameterized(&self) -> bool {
        !self.parameter_names().is_empty()
    }

    /// Check if every operation applies a unitary.
    pub fn has_unitary(&self) -> bool {
        *memoized(&self.inner.cache.has_unitary, || {
            analysis::has_unitary(&self.inner.moments)
        })
    }

    /// Check if any operation measures.
    pub fn has_measurements(&self) -> bool {
        *memoized(&self.inner.cache.has_measurements, || {
            analysis::has_measurements(&self.inner.moments)
        })
    }

    /// Check if no operation follows a measurement on one of its qubits.
    pub fn are_all_measurements_terminal(&self) -> bool {
        *memoized(&self.inner.cache.terminal_measurements, || {
            analysis::are_all_measurements_terminal(&self.inner.moments)
        })
    }

    /// This program followed by `other`.
    #[must_use]
    pub fn concat(&self, other: &FrozenProgram) -> Self {
        self.unfreeze().concat(&other.unfreeze()).into_frozen()
    }

    /// The moment sequence repeated `repetitions` times.
    #[must_use]
    pub fn repeat(&self, repetitions: i64) -> Self {
        self.unfreeze().repeat(repetitions).into_frozen()
    }

    /// The inverse program, if every operation is invertible.
    pub fn inverse(&self) -> Option<Self> {
        self.unfreeze().inverse().map(Program::into_frozen)
    }

    /// Raise to a power; `None` unless the exponent is `1` or `-1`.
    pub fn pow(&self, exponent: i64) -> Option<Self> {
        self.unfreeze().pow(exponent).map(Program::into_frozen)
    }
}

impl Default for FrozenProgram {
    fn default() -> Self {
        Self::from_moments(Vec::<Moment>::new(), vec![])
    }
}

impl PartialEq for FrozenProgram {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        self.inner.tags == other.inner.tags
            && (self.shares_moments_with(other) || self.inner.moments == other.inner.moments)
    }
}

impl Eq for FrozenProgram {}

impl Hash for FrozenProgram {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.structural_hash());
    }
}

impl fmt::Debug for FrozenProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrozenProgram")
            .field("moments", &self.inner.moments)
            .field("tags", &self.inner.tags)
            .finish()
    }
}

impl fmt::Display for FrozenProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_moments(&self.inner.moments, &self.inner.tags, f)
    }
}

impl From<Program> for FrozenProgram {
    fn from(program: Program) -> Self {
        program.into_frozen()
    }
}

impl Add for &FrozenProgram {
    type Output = FrozenProgram;

    fn add(self, rhs: &FrozenProgram) -> FrozenProgram {
        self.concat(rhs)
    }
}

impl Mul<i64> for &FrozenProgram {
    type Output = FrozenProgram;

    fn mul(self, repetitions: i64) -> FrozenProgram {
        self.repeat(repetitions)
    }
}

/// The persisted form: moments and tags only.
#[derive(Serialize)]
struct PersistedProgramRef<'a> {
    moments: &'a [Moment],
    tags: &'a [Tag],
}

#[derive(Deserialize)]
struct PersistedProgram {
    moments: Vec<Moment>,
    #[serde(default)]
    tags: Vec<Tag>,
}

impl Serialize for FrozenProgram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PersistedProgramRef {
            moments: &self.inner.moments,
            tags: &self.inner.tags,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FrozenProgram {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let persisted = PersistedProgram::deserialize(deserializer)?;
        Ok(Self::from_moments(persisted.moments, persisted.tags))
    }
}
