//! Parameter expressions and parameter bindings.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::float::{eq_f64, hash_f64};

/// A free symbol in a parameter expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    /// The symbol's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A symbolic or concrete parameter expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// A symbolic parameter.
    Symbol(Symbol),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Subtraction.
    Sub(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Division.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// Create a constant parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create a symbolic parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(Symbol::new(name))
    }

    /// Create a π constant.
    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    /// Check if this expression contains any symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Try to evaluate as a concrete f64 value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Pi => Some(PI),
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Sub(a, b) => Some(a.as_f64()? - b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            ParameterExpression::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
        }
    }

    /// The bare symbol, if this expression is nothing more than one.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            ParameterExpression::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Names of all free symbols in this expression.
    pub fn parameter_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, names: &mut BTreeSet<String>) {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => {}
            ParameterExpression::Symbol(s) => {
                names.insert(s.name().to_string());
            }
            ParameterExpression::Neg(e) => e.collect_names(names),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => {
                a.collect_names(names);
                b.collect_names(names);
            }
        }
    }

    /// Substitute symbols through a parameter map.
    ///
    /// Symbols bound to a number become constants, symbols bound to a name or
    /// symbol are renamed, and unbound symbols are left untouched.
    pub fn resolve(&self, params: &ParamMap) -> Self {
        match self {
            ParameterExpression::Symbol(s) => match lookup(params, s.name()) {
                Some(ParamValue::Int(v)) => ParameterExpression::Constant(*v as f64),
                Some(ParamValue::Float(v)) => ParameterExpression::Constant(*v),
                Some(ParamValue::Name(n)) => ParameterExpression::symbol(n.clone()),
                Some(ParamValue::Symbol(t)) => ParameterExpression::Symbol(t.clone()),
                None => self.clone(),
            },
            ParameterExpression::Constant(_) | ParameterExpression::Pi => self.clone(),
            ParameterExpression::Neg(e) => ParameterExpression::Neg(Box::new(e.resolve(params))),
            ParameterExpression::Add(a, b) => {
                ParameterExpression::Add(Box::new(a.resolve(params)), Box::new(b.resolve(params)))
            }
            ParameterExpression::Sub(a, b) => {
                ParameterExpression::Sub(Box::new(a.resolve(params)), Box::new(b.resolve(params)))
            }
            ParameterExpression::Mul(a, b) => {
                ParameterExpression::Mul(Box::new(a.resolve(params)), Box::new(b.resolve(params)))
            }
            ParameterExpression::Div(a, b) => {
                ParameterExpression::Div(Box::new(a.resolve(params)), Box::new(b.resolve(params)))
            }
        }
    }

    /// The negated expression, folding constants.
    pub fn negated(&self) -> Self {
        match self {
            ParameterExpression::Constant(v) => ParameterExpression::Constant(-v),
            ParameterExpression::Neg(e) => (**e).clone(),
            _ => ParameterExpression::Neg(Box::new(self.clone())),
        }
    }
}

fn lookup<'a>(params: &'a ParamMap, name: &str) -> Option<&'a ParamValue> {
    params
        .get(&ParamKey::Symbol(Symbol::new(name)))
        .or_else(|| params.get(&ParamKey::Name(name.to_string())))
}

impl PartialEq for ParameterExpression {
    // By hand since f64 is not Eq.
    fn eq(&self, other: &Self) -> bool {
        use ParameterExpression as P;
        match (self, other) {
            (P::Constant(a), P::Constant(b)) => eq_f64(*a, *b),
            (P::Symbol(a), P::Symbol(b)) => a == b,
            (P::Pi, P::Pi) => true,
            (P::Neg(a), P::Neg(b)) => a == b,
            (P::Add(a1, b1), P::Add(a2, b2))
            | (P::Sub(a1, b1), P::Sub(a2, b2))
            | (P::Mul(a1, b1), P::Mul(a2, b2))
            | (P::Div(a1, b1), P::Div(a2, b2)) => a1 == a2 && b1 == b2,
            (
                P::Constant(_)
                | P::Symbol(_)
                | P::Pi
                | P::Neg(_)
                | P::Add(..)
                | P::Sub(..)
                | P::Mul(..)
                | P::Div(..),
                _,
            ) => false,
        }
    }
}

impl Eq for ParameterExpression {}

impl Hash for ParameterExpression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ParameterExpression::Constant(v) => hash_f64(*v, state),
            ParameterExpression::Symbol(s) => s.hash(state),
            ParameterExpression::Pi => {}
            ParameterExpression::Neg(e) => e.hash(state),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => {
                a.hash(state);
                b.hash(state);
            }
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(s) => write!(f, "{s}"),
            ParameterExpression::Pi => write!(f, "π"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Sub(a, b) => write!(f, "({a} - {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
            ParameterExpression::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<Symbol> for ParameterExpression {
    fn from(symbol: Symbol) -> Self {
        ParameterExpression::Symbol(symbol)
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

/// Key of a parameter binding: a plain name or a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParamKey {
    /// A plain parameter name.
    Name(String),
    /// A symbol.
    Symbol(Symbol),
}

impl ParamKey {
    /// The parameter name this key binds.
    pub fn name(&self) -> &str {
        match self {
            ParamKey::Name(n) => n,
            ParamKey::Symbol(s) => s.name(),
        }
    }
}

/// Value of a parameter binding: a name, a symbol, or a number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParamValue {
    /// Rename to a plain parameter name.
    Name(String),
    /// Rename to a symbol.
    Symbol(Symbol),
    /// Bind to an integer.
    Int(i64),
    /// Bind to a float.
    Float(f64),
}

impl ParamValue {
    /// The parameter name this value refers to, if it is not a number.
    pub fn name(&self) -> Option<&str> {
        match self {
            ParamValue::Name(n) => Some(n),
            ParamValue::Symbol(s) => Some(s.name()),
            ParamValue::Int(_) | ParamValue::Float(_) => None,
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::Name(a), ParamValue::Name(b)) => a == b,
            (ParamValue::Symbol(a), ParamValue::Symbol(b)) => a == b,
            (ParamValue::Int(a), ParamValue::Int(b)) => a == b,
            (ParamValue::Float(a), ParamValue::Float(b)) => eq_f64(*a, *b),
            (
                ParamValue::Name(_)
                | ParamValue::Symbol(_)
                | ParamValue::Int(_)
                | ParamValue::Float(_),
                _,
            ) => false,
        }
    }
}

impl Eq for ParamValue {}

impl Hash for ParamValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ParamValue::Name(n) => n.hash(state),
            ParamValue::Symbol(s) => s.hash(state),
            ParamValue::Int(v) => v.hash(state),
            ParamValue::Float(v) => hash_f64(*v, state),
        }
    }
}

/// Parameter bindings applied when a sub-program is invoked.
pub type ParamMap = BTreeMap<ParamKey, ParamValue>;
