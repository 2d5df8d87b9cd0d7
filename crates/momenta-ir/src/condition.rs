//! Classical conditions over measurement results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator used by [`Condition::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Comparator {
    fn symbol(self) -> &'static str {
        match self {
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        }
    }
}

/// A predicate over classical measurement results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// True when the value stored under `key` is non-zero.
    Key {
        /// The measurement key.
        key: String,
    },
    /// True when `value(key) <comparator> value` holds.
    Compare {
        /// The measurement key.
        key: String,
        /// The comparison operator.
        comparator: Comparator,
        /// The right-hand side.
        value: i64,
    },
}

impl Condition {
    /// Create a non-zero test on a key.
    pub fn key(key: impl Into<String>) -> Self {
        Condition::Key { key: key.into() }
    }

    /// Create a comparison against a key.
    pub fn compare(key: impl Into<String>, comparator: Comparator, value: i64) -> Self {
        Condition::Compare {
            key: key.into(),
            comparator,
            value,
        }
    }

    /// The measurement keys read by this condition.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Condition::Key { key } | Condition::Compare { key, .. } => vec![key.as_str()],
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Key { key } => write!(f, "{key}"),
            Condition::Compare {
                key,
                comparator,
                value,
            } => write!(f, "{key} {} {value}", comparator.symbol()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Condition::compare("m", Comparator::Ne, 0).to_string(),
            "m != 0"
        );
    }
}
