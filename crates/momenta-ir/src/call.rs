//! Sub-program calls: invoking a frozen program as a single operation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::condition::Condition;
use crate::error::{IrError, IrResult};
use crate::frozen::FrozenProgram;
use crate::parameter::{ParamKey, ParamMap, ParamValue, ParameterExpression};
use crate::qubit::Qubit;

/// A composite operation that runs a [`FrozenProgram`] with repetition,
/// qubit and key remapping, parameter bindings and an optional termination
/// condition.
///
/// Built through [`SubProgramCall::builder`], which validates the
/// combination of settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "SubProgramCallRepr", try_from = "SubProgramCallRepr")]
pub struct SubProgramCall {
    program: FrozenProgram,
    repetitions: i64,
    repetition_ids: Option<Vec<String>>,
    qubit_map: BTreeMap<Qubit, Qubit>,
    measurement_key_map: BTreeMap<String, String>,
    param_map: ParamMap,
    use_repetition_ids: bool,
    repeat_until: Option<Condition>,
}

impl SubProgramCall {
    /// Start building a call into `program`.
    pub fn builder(program: FrozenProgram) -> SubProgramCallBuilder {
        SubProgramCallBuilder::new(program)
    }

    /// The invoked program.
    pub fn program(&self) -> &FrozenProgram {
        &self.program
    }

    /// Number of repetitions; negative counts run the inverse.
    pub fn repetitions(&self) -> i64 {
        self.repetitions
    }

    /// Explicitly supplied repetition ids.
    pub fn repetition_ids(&self) -> Option<&[String]> {
        self.repetition_ids.as_deref()
    }

    /// Whether measurement keys are prefixed per repetition.
    pub fn use_repetition_ids(&self) -> bool {
        self.use_repetition_ids
    }

    /// The ids actually used to prefix measurement keys.
    ///
    /// The explicit list when one was supplied, otherwise `"0".."n-1"` for
    /// `|repetitions| != 1`. `None` when repetition ids are not in use.
    pub fn effective_repetition_ids(&self) -> Option<Vec<String>> {
        if !self.use_repetition_ids {
            return None;
        }
        match &self.repetition_ids {
            Some(ids) => Some(ids.clone()),
            None => default_repetition_ids(self.repetitions),
        }
    }

    /// Qubit renaming applied on invocation.
    pub fn qubit_map(&self) -> &BTreeMap<Qubit, Qubit> {
        &self.qubit_map
    }

    /// Measurement key renaming applied on invocation.
    pub fn measurement_key_map(&self) -> &BTreeMap<String, String> {
        &self.measurement_key_map
    }

    /// Parameter bindings applied on invocation.
    pub fn param_map(&self) -> &ParamMap {
        &self.param_map
    }

    /// Condition that ends repetition, if any.
    pub fn repeat_until(&self) -> Option<&Condition> {
        self.repeat_until.as_ref()
    }

    /// The qubits the call acts on: the program's qubits in their own order,
    /// passed through the qubit map.
    pub fn qubits(&self) -> Vec<Qubit> {
        map_qubits(&self.program, &self.qubit_map)
    }

    /// Measurement keys written, after renaming and repetition prefixes.
    pub fn measurement_keys(&self) -> BTreeSet<String> {
        let keys = mapped_keys(self.program.measurement_keys(), &self.measurement_key_map);
        match self.effective_repetition_ids() {
            Some(ids) => ids
                .iter()
                .flat_map(|id| keys.iter().map(move |key| format!("{id}:{key}")))
                .collect(),
            None => keys,
        }
    }

    /// Keys read from outside the call.
    pub fn control_keys(&self) -> BTreeSet<String> {
        let mut keys = mapped_keys(self.program.control_keys(), &self.measurement_key_map);
        if let Some(condition) = &self.repeat_until {
            keys.extend(condition.keys().into_iter().map(str::to_string));
        }
        let measured = self.measurement_keys();
        keys.retain(|key| !measured.contains(key));
        keys
    }

    /// Free parameter names after applying the parameter bindings.
    pub fn parameter_names(&self) -> BTreeSet<String> {
        self.program
            .parameter_names()
            .iter()
            .flat_map(|name| {
                ParameterExpression::symbol(name.clone())
                    .resolve(&self.param_map)
                    .parameter_names()
            })
            .collect()
    }

    /// A call has a unitary when the program does and it is not a loop.
    pub fn has_unitary(&self) -> bool {
        self.repeat_until.is_none() && self.program.has_unitary()
    }

    /// Multiply the repetition count by `factor`.
    ///
    /// Explicit ids are expanded as `"<i>-<id>"` when `|factor| != 1`.
    pub fn repeat(&self, factor: i64) -> IrResult<Self> {
        let repetition_ids = match (&self.repetition_ids, default_repetition_ids(factor)) {
            (Some(ids), Some(outer)) => Some(
                outer
                    .iter()
                    .flat_map(|o| ids.iter().map(move |id| format!("{o}-{id}")))
                    .collect(),
            ),
            (ids, _) => ids.clone(),
        };
        self.rebuild()
            .repetitions(self.repetitions.saturating_mul(factor))
            .set_repetition_ids(repetition_ids)
            .build()
    }

    /// The call run backwards, if the program is invertible.
    pub fn inverse(&self) -> Option<Self> {
        self.repeat(-1).ok()
    }

    /// The same call into a different program, re-validated.
    pub fn with_program(&self, program: FrozenProgram) -> IrResult<Self> {
        SubProgramCallBuilder {
            program,
            ..self.rebuild()
        }
        .build()
    }

    fn rebuild(&self) -> SubProgramCallBuilder {
        SubProgramCallBuilder {
            program: self.program.clone(),
            repetitions: Some(self.repetitions),
            repetition_ids: self.repetition_ids.clone(),
            qubit_map: self.qubit_map.clone(),
            measurement_key_map: self.measurement_key_map.clone(),
            param_map: self.param_map.clone(),
            use_repetition_ids: Some(self.use_repetition_ids),
            repeat_until: self.repeat_until.clone(),
        }
    }
}

impl fmt::Display for SubProgramCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qubits = self
            .qubits()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "call[{} moments, x{}]({qubits})",
            self.program.num_moments(),
            self.repetitions
        )?;
        if let Some(condition) = &self.repeat_until {
            write!(f, ".until({condition})")?;
        }
        Ok(())
    }
}

fn default_repetition_ids(repetitions: i64) -> Option<Vec<String>> {
    if repetitions.unsigned_abs() == 1 {
        return None;
    }
    Some((0..repetitions.unsigned_abs()).map(|i| i.to_string()).collect())
}

fn map_qubits(program: &FrozenProgram, qubit_map: &BTreeMap<Qubit, Qubit>) -> Vec<Qubit> {
    program
        .qubits()
        .iter()
        .map(|q| qubit_map.get(q).unwrap_or(q).clone())
        .collect()
}

fn mapped_keys(keys: &BTreeSet<String>, key_map: &BTreeMap<String, String>) -> BTreeSet<String> {
    keys.iter()
        .map(|key| key_map.get(key).unwrap_or(key).clone())
        .collect()
}

/// Builder for [`SubProgramCall`].
#[derive(Debug, Clone)]
#[must_use]
pub struct SubProgramCallBuilder {
    program: FrozenProgram,
    repetitions: Option<i64>,
    repetition_ids: Option<Vec<String>>,
    qubit_map: BTreeMap<Qubit, Qubit>,
    measurement_key_map: BTreeMap<String, String>,
    param_map: ParamMap,
    use_repetition_ids: Option<bool>,
    repeat_until: Option<Condition>,
}

impl SubProgramCallBuilder {
    fn new(program: FrozenProgram) -> Self {
        Self {
            program,
            repetitions: None,
            repetition_ids: None,
            qubit_map: BTreeMap::new(),
            measurement_key_map: BTreeMap::new(),
            param_map: ParamMap::new(),
            use_repetition_ids: None,
            repeat_until: None,
        }
    }

    /// Set the repetition count. Defaults to the number of explicit ids, or 1.
    pub fn repetitions(mut self, repetitions: i64) -> Self {
        self.repetitions = Some(repetitions);
        self
    }

    /// Set explicit repetition ids.
    pub fn repetition_ids<S: Into<String>>(self, ids: impl IntoIterator<Item = S>) -> Self {
        self.set_repetition_ids(Some(ids.into_iter().map(Into::into).collect()))
    }

    fn set_repetition_ids(mut self, ids: Option<Vec<String>>) -> Self {
        self.repetition_ids = ids;
        self
    }

    /// Set the qubit map.
    pub fn qubit_map(mut self, qubit_map: BTreeMap<Qubit, Qubit>) -> Self {
        self.qubit_map = qubit_map;
        self
    }

    /// Set the measurement key map.
    pub fn measurement_key_map(mut self, key_map: BTreeMap<String, String>) -> Self {
        self.measurement_key_map = key_map;
        self
    }

    /// Set the parameter bindings.
    pub fn param_map(mut self, param_map: ParamMap) -> Self {
        self.param_map = param_map;
        self
    }

    /// Bind one parameter.
    pub fn bind(mut self, key: ParamKey, value: ParamValue) -> Self {
        self.param_map.insert(key, value);
        self
    }

    /// Choose whether measurement keys are prefixed per repetition.
    ///
    /// Defaults to on exactly when explicit ids are supplied.
    pub fn use_repetition_ids(mut self, use_ids: bool) -> Self {
        self.use_repetition_ids = Some(use_ids);
        self
    }

    /// Repeat until `condition` holds.
    pub fn repeat_until(mut self, condition: Option<Condition>) -> Self {
        self.repeat_until = condition;
        self
    }

    /// Validate and build the call.
    pub fn build(self) -> IrResult<SubProgramCall> {
        let repetitions = self.repetitions.unwrap_or_else(|| {
            self.repetition_ids
                .as_ref()
                .map_or(1, |ids| ids.len() as i64)
        });
        if let Some(ids) = &self.repetition_ids {
            if ids.len() as u64 != repetitions.unsigned_abs() {
                return Err(IrError::RepetitionIdsMismatch {
                    expected: repetitions.unsigned_abs(),
                    got: ids.len(),
                });
            }
        }
        let use_repetition_ids = self
            .use_repetition_ids
            .unwrap_or(self.repetition_ids.is_some());

        if let Some(condition) = &self.repeat_until {
            if use_repetition_ids || repetitions != 1 {
                return Err(IrError::RepeatUntilWithRepetitions);
            }
            let measured =
                mapped_keys(self.program.measurement_keys(), &self.measurement_key_map);
            let keys = condition.keys();
            if keys.iter().all(|key| !measured.contains(*key)) {
                return Err(IrError::InfiniteLoop {
                    keys: keys.into_iter().map(str::to_string).collect(),
                });
            }
        }

        if repetitions < 0 && self.program.inverse().is_none() {
            return Err(IrError::NotInvertible { repetitions });
        }

        let mut seen = BTreeSet::new();
        for qubit in map_qubits(&self.program, &self.qubit_map) {
            if seen.contains(&qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    op_name: Some("call".into()),
                });
            }
            seen.insert(qubit);
        }

        Ok(SubProgramCall {
            program: self.program,
            repetitions,
            repetition_ids: self.repetition_ids,
            qubit_map: self.qubit_map,
            measurement_key_map: self.measurement_key_map,
            param_map: self.param_map,
            use_repetition_ids,
            repeat_until: self.repeat_until,
        })
    }
}

/// Persisted form; maps become pair lists so non-string keys survive JSON.
#[derive(Serialize, Deserialize)]
struct SubProgramCallRepr {
    program: FrozenProgram,
    repetitions: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repetition_ids: Option<Vec<String>>,
    #[serde(default)]
    qubit_map: Vec<(Qubit, Qubit)>,
    #[serde(default)]
    measurement_key_map: Vec<(String, String)>,
    #[serde(default)]
    param_map: Vec<(ParamKey, ParamValue)>,
    #[serde(default)]
    use_repetition_ids: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repeat_until: Option<Condition>,
}

impl From<SubProgramCall> for SubProgramCallRepr {
    fn from(call: SubProgramCall) -> Self {
        Self {
            program: call.program,
            repetitions: call.repetitions,
            repetition_ids: call.repetition_ids,
            qubit_map: call.qubit_map.into_iter().collect(),
            measurement_key_map: call.measurement_key_map.into_iter().collect(),
            param_map: call.param_map.into_iter().collect(),
            use_repetition_ids: call.use_repetition_ids,
            repeat_until: call.repeat_until,
        }
    }
}

impl TryFrom<SubProgramCallRepr> for SubProgramCall {
    type Error = IrError;

    fn try_from(repr: SubProgramCallRepr) -> IrResult<Self> {
        SubProgramCallBuilder {
            program: repr.program,
            repetitions: Some(repr.repetitions),
            repetition_ids: repr.repetition_ids,
            qubit_map: repr.qubit_map.into_iter().collect(),
            measurement_key_map: repr.measurement_key_map.into_iter().collect(),
            param_map: repr.param_map.into_iter().collect(),
            use_repetition_ids: Some(repr.use_repetition_ids),
            repeat_until: repr.repeat_until,
        }
        .build()
    }
}
