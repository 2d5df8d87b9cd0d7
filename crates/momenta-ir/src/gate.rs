//! Quantum gate types.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::float::{eq_complex, hash_complex};
use crate::parameter::ParameterExpression;

/// A global phase coefficient.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coefficient(pub Complex64);

impl PartialEq for Coefficient {
    fn eq(&self, other: &Self) -> bool {
        eq_complex(self.0, other.0)
    }
}

impl Eq for Coefficient {}

impl Hash for Coefficient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_complex(self.0, state);
    }
}

/// Standard gates with known semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(ParameterExpression),
    /// Rotation around Y axis.
    Ry(ParameterExpression),
    /// Rotation around Z axis.
    Rz(ParameterExpression),
    /// Phase gate.
    P(ParameterExpression),

    // Multi-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
    /// Toffoli gate (CCX).
    CCX,

    /// Global phase; acts on no qubits.
    GlobalPhase(Coefficient),
}

impl StandardGate {
    /// Create a global phase gate.
    pub fn global_phase(coefficient: Complex64) -> Self {
        StandardGate::GlobalPhase(Coefficient(coefficient))
    }

    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::Swap => "swap",
            StandardGate::CCX => "ccx",
            StandardGate::GlobalPhase(_) => "global_phase",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::GlobalPhase(_) => 0,

            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_) => 1,

            StandardGate::CX | StandardGate::CZ | StandardGate::Swap => 2,

            StandardGate::CCX => 3,
        }
    }

    /// Get parameters of this gate.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            StandardGate::Rx(p) | StandardGate::Ry(p) | StandardGate::Rz(p) | StandardGate::P(p) => {
                vec![p]
            }
            _ => vec![],
        }
    }

    /// Check if this gate is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::Z
                | StandardGate::S
                | StandardGate::Sdg
                | StandardGate::T
                | StandardGate::Tdg
                | StandardGate::Rz(_)
                | StandardGate::P(_)
                | StandardGate::CZ
                | StandardGate::GlobalPhase(_)
        )
    }

    /// The inverse gate.
    pub fn inverse(&self) -> Self {
        match self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::Rx(p) => StandardGate::Rx(p.negated()),
            StandardGate::Ry(p) => StandardGate::Ry(p.negated()),
            StandardGate::Rz(p) => StandardGate::Rz(p.negated()),
            StandardGate::P(p) => StandardGate::P(p.negated()),
            StandardGate::GlobalPhase(c) => StandardGate::GlobalPhase(Coefficient(c.0.inv())),
            // Self-inverse.
            other => other.clone(),
        }
    }
}

/// A user-defined gate with opaque semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
    /// The number of qubits it operates on.
    pub num_qubits: u32,
    /// Parameters of the gate.
    pub params: Vec<ParameterExpression>,
    /// Name of the inverse gate, if the gate is known to be invertible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_name: Option<String>,
}

impl CustomGate {
    /// Create a new custom gate.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            params: vec![],
            inverse_name: None,
        }
    }

    /// Add parameters to the gate.
    #[must_use]
    pub fn with_params(mut self, params: Vec<ParameterExpression>) -> Self {
        self.params = params;
        self
    }

    /// Declare the name of the inverse gate.
    #[must_use]
    pub fn with_inverse(mut self, inverse_name: impl Into<String>) -> Self {
        self.inverse_name = Some(inverse_name.into());
        self
    }
}

/// A quantum gate, either standard or custom.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A custom user-defined gate.
    Custom(CustomGate),
}

impl Gate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Gate::Standard(g) => g.name(),
            Gate::Custom(g) => &g.name,
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            Gate::Standard(g) => g.num_qubits(),
            Gate::Custom(g) => g.num_qubits,
        }
    }

    /// Get the parameters of this gate.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            Gate::Standard(g) => g.parameters(),
            Gate::Custom(g) => g.params.iter().collect(),
        }
    }

    /// Check if any parameter is symbolic.
    pub fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|p| p.is_symbolic())
    }

    /// Check if the gate is known to be diagonal.
    pub fn is_diagonal(&self) -> bool {
        match self {
            Gate::Standard(g) => g.is_diagonal(),
            Gate::Custom(_) => false,
        }
    }

    /// The inverse gate, if known.
    pub fn inverse(&self) -> Option<Self> {
        match self {
            Gate::Standard(g) => Some(Gate::Standard(g.inverse())),
            Gate::Custom(g) => g.inverse_name.as_ref().map(|inverse| {
                Gate::Custom(CustomGate {
                    name: inverse.clone(),
                    num_qubits: g.num_qubits,
                    params: g.params.clone(),
                    inverse_name: Some(g.name.clone()),
                })
            }),
        }
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::Standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::Custom(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CZ.num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
        assert_eq!(
            StandardGate::global_phase(Complex64::new(0.0, 1.0)).num_qubits(),
            0
        );

        let h: Gate = StandardGate::H.into();
        assert!(!h.is_parameterized());
        let rx: Gate = StandardGate::Rx(ParameterExpression::constant(PI)).into();
        assert!(!rx.is_parameterized());
        let rx_theta: Gate = StandardGate::Rx(ParameterExpression::symbol("theta")).into();
        assert!(rx_theta.is_parameterized());
    }

    #[test]
    fn test_inverse() {
        assert_eq!(StandardGate::S.inverse(), StandardGate::Sdg);
        assert_eq!(StandardGate::CZ.inverse(), StandardGate::CZ);
        assert_eq!(
            StandardGate::Rz(ParameterExpression::constant(0.5)).inverse(),
            StandardGate::Rz(ParameterExpression::constant(-0.5))
        );
        assert_eq!(
            StandardGate::global_phase(Complex64::new(0.0, 1.0)).inverse(),
            StandardGate::global_phase(Complex64::new(0.0, -1.0))
        );

        let opaque: Gate = CustomGate::new("my_gate", 2).into();
        assert!(opaque.inverse().is_none());
        let invertible: Gate = CustomGate::new("fwd", 1).with_inverse("bwd").into();
        assert_eq!(invertible.inverse().map(|g| g.name().to_string()), Some("bwd".into()));
    }

    #[test]
    fn test_custom_gate() {
        let custom = CustomGate::new("my_gate", 2)
            .with_params(vec![ParameterExpression::constant(PI / 4.0)]);

        assert_eq!(custom.name, "my_gate");
        assert_eq!(custom.num_qubits, 2);
        assert_eq!(custom.params.len(), 1);
    }
}
