//! Encoded argument values and their decoded form.

use serde::{Deserialize, Serialize};

use momenta_ir::{ParamKey, ParamValue, ParameterExpression, Symbol};

use crate::error::{SerialError, SerialResult};

/// An argument as it appears in a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgRecord {
    String(String),
    Symbol(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    FloatList(Vec<f64>),
    BoolList(Vec<bool>),
    Expression(ParameterExpression),
}

/// A decoded argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Name(String),
    Symbol(Symbol),
    Float(f64),
    Int(i64),
    Bool(bool),
    FloatList(Vec<f64>),
    BoolList(Vec<bool>),
    Expression(ParameterExpression),
}

impl Arg {
    /// Short name of this argument's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Name(_) => "name",
            Arg::Symbol(_) => "symbol",
            Arg::Float(_) => "float",
            Arg::Int(_) => "int",
            Arg::Bool(_) => "bool",
            Arg::FloatList(_) => "float list",
            Arg::BoolList(_) => "bool list",
            Arg::Expression(_) => "expression",
        }
    }

    /// Use this argument as a parameter map key.
    pub fn into_param_key(self) -> SerialResult<ParamKey> {
        match self {
            Arg::Name(name) => Ok(ParamKey::Name(name)),
            Arg::Symbol(symbol) => Ok(ParamKey::Symbol(symbol)),
            other => Err(SerialError::InvalidKeyType {
                kind: other.kind(),
                arg: format!("{other:?}"),
            }),
        }
    }

    /// Use this argument as a parameter map value.
    pub fn into_param_value(self) -> SerialResult<ParamValue> {
        match self {
            Arg::Name(name) => Ok(ParamValue::Name(name)),
            Arg::Symbol(symbol) => Ok(ParamValue::Symbol(symbol)),
            Arg::Float(value) => Ok(ParamValue::Float(value)),
            Arg::Int(value) => Ok(ParamValue::Int(value)),
            Arg::Bool(value) => Ok(ParamValue::Int(i64::from(value))),
            other => Err(SerialError::InvalidValueType {
                kind: other.kind(),
                arg: format!("{other:?}"),
            }),
        }
    }

    /// Use this argument as a gate angle, if it is numeric or symbolic.
    pub fn into_parameter(self) -> Option<ParameterExpression> {
        match self {
            Arg::Symbol(symbol) => Some(symbol.into()),
            Arg::Float(value) => Some(value.into()),
            Arg::Int(value) => Some((value as f64).into()),
            Arg::Expression(expr) => Some(expr),
            Arg::Name(_) | Arg::Bool(_) | Arg::FloatList(_) | Arg::BoolList(_) => None,
        }
    }
}

impl From<&ArgRecord> for Arg {
    fn from(record: &ArgRecord) -> Self {
        match record {
            ArgRecord::String(s) => Arg::Name(s.clone()),
            ArgRecord::Symbol(s) => Arg::Symbol(Symbol::new(s.clone())),
            ArgRecord::Float(v) => Arg::Float(*v),
            ArgRecord::Int(v) => Arg::Int(*v),
            ArgRecord::Bool(v) => Arg::Bool(*v),
            ArgRecord::FloatList(v) => Arg::FloatList(v.clone()),
            ArgRecord::BoolList(v) => Arg::BoolList(v.clone()),
            // Bare symbols and constant expressions collapse to simpler kinds.
            ArgRecord::Expression(expr) => {
                if let Some(symbol) = expr.as_symbol() {
                    Arg::Symbol(symbol.clone())
                } else if let (false, Some(value)) = (expr.is_symbolic(), expr.as_f64()) {
                    Arg::Float(value)
                } else {
                    Arg::Expression(expr.clone())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_collapse() {
        let bare = ArgRecord::Expression(ParameterExpression::symbol("t"));
        assert_eq!(Arg::from(&bare), Arg::Symbol(Symbol::new("t")));

        let constant = ArgRecord::Expression(
            ParameterExpression::constant(0.5) * ParameterExpression::constant(2.0),
        );
        assert_eq!(Arg::from(&constant), Arg::Float(1.0));

        let symbolic = ParameterExpression::symbol("t") * ParameterExpression::constant(2.0);
        assert_eq!(
            Arg::from(&ArgRecord::Expression(symbolic.clone())),
            Arg::Expression(symbolic)
        );
    }

    #[test]
    fn test_param_keys() {
        assert_eq!(
            Arg::Name("a".into()).into_param_key().unwrap(),
            ParamKey::Name("a".into())
        );
        assert!(matches!(
            Arg::Float(1.0).into_param_key(),
            Err(SerialError::InvalidKeyType { kind: "float", .. })
        ));
    }

    #[test]
    fn test_param_values() {
        assert_eq!(Arg::Int(3).into_param_value().unwrap(), ParamValue::Int(3));
        assert_eq!(Arg::Bool(true).into_param_value().unwrap(), ParamValue::Int(1));
        assert_eq!(Arg::Bool(false).into_param_value().unwrap(), ParamValue::Int(0));
        assert!(matches!(
            Arg::BoolList(vec![true]).into_param_value(),
            Err(SerialError::InvalidValueType {
                kind: "bool list",
                ..
            })
        ));
        let expr = ParameterExpression::symbol("a") + ParameterExpression::symbol("b");
        assert!(matches!(
            Arg::Expression(expr).into_param_value(),
            Err(SerialError::InvalidValueType {
                kind: "expression",
                ..
            })
        ));
    }
}
