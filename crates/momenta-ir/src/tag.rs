//! Metadata tags attached to operations and programs.
//!
//! Tags are broad in memory and narrow on persist: any `Eq + Hash` value can
//! be attached through [`Tag::opaque`], but only [`Tag::Name`] and
//! [`Tag::Int`] survive serialization.

use serde::de::Deserializer;
use serde::ser::{Error as _, Serializer};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Capability required of in-memory tag values.
pub trait TagValue: Any + Send + Sync + fmt::Debug {
    /// Equality against another tag value of any type.
    fn dyn_eq(&self, other: &dyn TagValue) -> bool;

    /// Feed this value into a hasher.
    fn dyn_hash(&self, state: &mut dyn Hasher);

    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T> TagValue for T
where
    T: Any + Send + Sync + fmt::Debug + Eq + Hash,
{
    fn dyn_eq(&self, other: &dyn TagValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An in-memory tag value of arbitrary type.
#[derive(Clone)]
pub struct OpaqueTag(Arc<dyn TagValue>);

impl OpaqueTag {
    /// Downcast to a concrete tag type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for OpaqueTag {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(other.0.as_ref())
    }
}

impl Eq for OpaqueTag {}

impl Hash for OpaqueTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_any().type_id().hash(state);
        self.0.dyn_hash(state);
    }
}

impl fmt::Debug for OpaqueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Metadata attached to an operation or program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A string tag.
    Name(String),
    /// An integer tag.
    Int(i64),
    /// Any other hashable value; rejected when persisting.
    Opaque(OpaqueTag),
}

impl Tag {
    /// Create a string tag.
    pub fn name(name: impl Into<String>) -> Self {
        Tag::Name(name.into())
    }

    /// Wrap an arbitrary hashable value as a tag.
    pub fn opaque<T>(value: T) -> Self
    where
        T: Any + Send + Sync + fmt::Debug + Eq + Hash,
    {
        Tag::Opaque(OpaqueTag(Arc::new(value)))
    }

    /// Whether this tag can be written to the persisted form.
    pub fn is_persistable(&self) -> bool {
        !matches!(self, Tag::Opaque(_))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Name(name) => write!(f, "{name:?}"),
            Tag::Int(value) => write!(f, "{value}"),
            Tag::Opaque(tag) => write!(f, "{tag:?}"),
        }
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::Name(name.to_string())
    }
}

impl From<i64> for Tag {
    fn from(value: i64) -> Self {
        Tag::Int(value)
    }
}

/// The persisted subset of [`Tag`].
#[derive(Serialize, Deserialize)]
enum PersistedTag {
    Name(String),
    Int(i64),
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let persisted = match self {
            Tag::Name(name) => PersistedTag::Name(name.clone()),
            Tag::Int(value) => PersistedTag::Int(*value),
            Tag::Opaque(tag) => {
                return Err(S::Error::custom(format!(
                    "tag {tag:?} cannot be persisted; only string and integer tags are"
                )));
            }
        };
        persisted.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PersistedTag::deserialize(deserializer)? {
            PersistedTag::Name(name) => Tag::Name(name),
            PersistedTag::Int(value) => Tag::Int(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq, Hash)]
    struct Calibration {
        run: u32,
    }

    #[test]
    fn test_opaque_equality() {
        let a = Tag::opaque(Calibration { run: 1 });
        let b = Tag::opaque(Calibration { run: 1 });
        let c = Tag::opaque(Calibration { run: 2 });
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Tag::name("run"));
        // Same payload bits, different types.
        assert_ne!(Tag::opaque(1_u32), Tag::opaque(1_i32));
    }

    #[test]
    fn test_opaque_downcast() {
        let Tag::Opaque(tag) = Tag::opaque(Calibration { run: 7 }) else {
            panic!("Expected opaque tag");
        };
        assert_eq!(tag.downcast_ref::<Calibration>().map(|c| c.run), Some(7));
        assert!(tag.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_persist_narrowing() {
        let json = serde_json::to_string(&vec![Tag::name("a"), Tag::Int(3)]).unwrap();
        let back: Vec<Tag> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Tag::name("a"), Tag::Int(3)]);

        assert!(!Tag::opaque(Calibration { run: 0 }).is_persistable());
        assert!(serde_json::to_string(&Tag::opaque(Calibration { run: 0 })).is_err());
    }
}
