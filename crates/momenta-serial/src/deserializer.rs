//! Reconstruct operations and programs from records.
//!
//! Dispatch is over the closed [`RecordKind`] set. Every function here is a
//! pure function of the record and the constant table.

use std::collections::BTreeMap;

use num_complex::Complex64;
use tracing::debug;

use momenta_ir::{
    CustomGate, FrozenProgram, Gate, Moment, Operation, ParamMap, ParameterExpression, Qubit,
    StandardGate, SubProgramCall,
};

use crate::arg::{Arg, ArgRecord};
use crate::constant::ConstantTable;
use crate::error::{SerialError, SerialResult};
use crate::record::{
    ConditionRecord, GateRecord, OperationRecord, ProgramRecord, RecordKind, SubProgramCallRecord,
};

/// Decode one operation record.
pub fn deserialize_operation(
    record: &OperationRecord,
    table: &ConstantTable,
) -> SerialResult<Operation> {
    let op = match &record.kind {
        RecordKind::Gate(gate) => deserialize_gate(gate)?,
        RecordKind::Measure(measure) => {
            Operation::measure(qubits(&measure.qubits), measure.key.clone())?
        }
        RecordKind::Reset { qubit } => Operation::reset(Qubit::from_proto_id(qubit)),
        RecordKind::SubProgramCall(call) => deserialize_sub_program_call(call, table)?,
    };
    Ok(op.with_tags(record.tags.iter().cloned()))
}

/// Decode a program record into a frozen program.
pub fn deserialize_program(
    record: &ProgramRecord,
    table: &ConstantTable,
) -> SerialResult<FrozenProgram> {
    let mut moments = Vec::with_capacity(record.moments.len());
    for ops in &record.moments {
        let ops = ops
            .iter()
            .map(|op| deserialize_operation(op, table))
            .collect::<SerialResult<Vec<_>>>()?;
        moments.push(Moment::from_operations(ops)?);
    }
    Ok(FrozenProgram::from_moments(moments, record.tags.clone()))
}

/// Decode a sub-program call record.
///
/// The call is wrapped in a classically controlled operation when the
/// record carries guard conditions.
pub fn deserialize_sub_program_call(
    record: &SubProgramCallRecord,
    table: &ConstantTable,
) -> SerialResult<Operation> {
    let program = table.program(record.constant_index)?;
    let (repetitions, repetition_ids) = record.repetitions();

    let qubit_map: BTreeMap<Qubit, Qubit> = record
        .operand_map
        .iter()
        .map(|(from, to)| (Qubit::from_proto_id(from), Qubit::from_proto_id(to)))
        .collect();
    let measurement_key_map: BTreeMap<String, String> = record.label_map.iter().cloned().collect();
    let param_map = param_map(&record.param_map)?;
    let repeat_until = record
        .repeat_until
        .as_ref()
        .map(ConditionRecord::decode)
        .transpose()?;

    let mut builder = SubProgramCall::builder(program.clone())
        .repetitions(repetitions)
        .qubit_map(qubit_map)
        .measurement_key_map(measurement_key_map)
        .param_map(param_map)
        .use_repetition_ids(record.use_explicit_identifiers)
        .repeat_until(repeat_until);
    if let Some(ids) = repetition_ids {
        builder = builder.repetition_ids(ids.iter().cloned());
    }
    let call = builder.build()?;

    let conditions = record
        .conditioned_on
        .iter()
        .map(ConditionRecord::decode)
        .collect::<SerialResult<Vec<_>>>()?;
    debug!(
        "Decoded call into constant {} with {} guard conditions",
        record.constant_index,
        conditions.len()
    );
    Ok(Operation::sub_program(call).with_classical_controls(conditions))
}

fn qubits(ids: &[String]) -> impl Iterator<Item = Qubit> + '_ {
    ids.iter().map(|id| Qubit::from_proto_id(id))
}

fn param_map(entries: &[(ArgRecord, ArgRecord)]) -> SerialResult<ParamMap> {
    // Every key is checked before any value.
    let keys = entries
        .iter()
        .map(|(key, _)| Arg::from(key).into_param_key())
        .collect::<SerialResult<Vec<_>>>()?;
    let values = entries
        .iter()
        .map(|(_, value)| Arg::from(value).into_param_value())
        .collect::<SerialResult<Vec<_>>>()?;
    Ok(keys.into_iter().zip(values).collect())
}

fn deserialize_gate(record: &GateRecord) -> SerialResult<Operation> {
    let invalid = |reason: String| SerialError::InvalidGate {
        gate: record.name.clone(),
        reason,
    };

    if record.name == "global_phase" {
        let coefficient = match record.args.as_slice() {
            [ArgRecord::FloatList(parts)] if parts.len() == 2 => Complex64::new(parts[0], parts[1]),
            _ => return Err(invalid("expected one [re, im] float list".into())),
        };
        return Ok(Operation::gate(
            StandardGate::global_phase(coefficient),
            qubits(&record.qubits),
        )?);
    }

    let params = record
        .args
        .iter()
        .map(|arg| {
            let arg = Arg::from(arg);
            let kind = arg.kind();
            arg.into_parameter()
                .ok_or_else(|| invalid(format!("{kind} argument is not an angle")))
        })
        .collect::<SerialResult<Vec<_>>>()?;

    let gate: Gate = match standard_gate(&record.name, &params) {
        Some(gate) => gate?.into(),
        None => {
            let num_qubits = custom_arity(&record.name, record.qubits.len())?;
            CustomGate::new(record.name.clone(), num_qubits)
                .with_params(params)
                .into()
        }
    };
    Ok(Operation::gate(gate, qubits(&record.qubits))?)
}

fn custom_arity(name: &str, len: usize) -> SerialResult<u32> {
    u32::try_from(len).map_err(|_| SerialError::InvalidGate {
        gate: name.to_string(),
        reason: format!("{len} qubits do not fit a gate arity"),
    })
}

/// Look up a standard gate by name; `None` for unknown names.
fn standard_gate(
    name: &str,
    params: &[ParameterExpression],
) -> Option<SerialResult<StandardGate>> {
    let fixed = match name {
        "id" => StandardGate::I,
        "x" => StandardGate::X,
        "y" => StandardGate::Y,
        "z" => StandardGate::Z,
        "h" => StandardGate::H,
        "s" => StandardGate::S,
        "sdg" => StandardGate::Sdg,
        "t" => StandardGate::T,
        "tdg" => StandardGate::Tdg,
        "cx" => StandardGate::CX,
        "cz" => StandardGate::CZ,
        "swap" => StandardGate::Swap,
        "ccx" => StandardGate::CCX,
        "rx" | "ry" | "rz" | "p" => {
            let [angle] = params else {
                return Some(Err(param_count(name, 1, params.len())));
            };
            let angle = angle.clone();
            return Some(Ok(match name {
                "rx" => StandardGate::Rx(angle),
                "ry" => StandardGate::Ry(angle),
                "rz" => StandardGate::Rz(angle),
                _ => StandardGate::P(angle),
            }));
        }
        _ => return None,
    };
    if !params.is_empty() {
        return Some(Err(param_count(name, 0, params.len())));
    }
    Some(Ok(fixed))
}

fn param_count(name: &str, expected: usize, got: usize) -> SerialError {
    SerialError::InvalidGate {
        gate: name.to_string(),
        reason: format!("expects {expected} parameters, got {got}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MeasureRecord;
    use momenta_ir::{IrError, Tag};

    fn gate(name: &str, args: Vec<ArgRecord>, qubits: &[&str]) -> OperationRecord {
        GateRecord {
            name: name.into(),
            args,
            qubits: qubits.iter().map(|q| q.to_string()).collect(),
        }
        .into()
    }

    #[test]
    fn test_gates() {
        let table = ConstantTable::new();
        let op = deserialize_operation(&gate("cz", vec![], &["0_1", "0_2"]), &table).unwrap();
        assert_eq!(
            op,
            Operation::gate(StandardGate::CZ, [Qubit::grid(0, 1), Qubit::grid(0, 2)]).unwrap()
        );

        let op = deserialize_operation(
            &gate("rz", vec![ArgRecord::Symbol("t".into())], &["3"]),
            &table,
        )
        .unwrap();
        assert_eq!(
            op,
            Operation::gate(
                StandardGate::Rz(ParameterExpression::symbol("t")),
                [Qubit::line(3)]
            )
            .unwrap()
        );

        let op = deserialize_operation(
            &gate("global_phase", vec![ArgRecord::FloatList(vec![0.0, 1.0])], &[]),
            &table,
        )
        .unwrap();
        assert_eq!(
            op,
            Operation::gate(StandardGate::global_phase(Complex64::new(0.0, 1.0)), []).unwrap()
        );
    }

    #[test]
    fn test_custom_gate() {
        let op = deserialize_operation(
            &gate("fsim", vec![ArgRecord::Float(0.5), ArgRecord::Int(1)], &["0", "1"]),
            &ConstantTable::new(),
        )
        .unwrap();
        let gate = op.as_gate().unwrap();
        assert_eq!(gate.name(), "fsim");
        assert_eq!(gate.num_qubits(), 2);
        assert_eq!(gate.parameters().len(), 2);
    }

    #[test]
    fn test_gate_errors() {
        let table = ConstantTable::new();
        assert!(matches!(
            deserialize_operation(&gate("rx", vec![], &["0"]), &table),
            Err(SerialError::InvalidGate { .. })
        ));
        assert!(matches!(
            deserialize_operation(&gate("h", vec![ArgRecord::Float(1.0)], &["0"]), &table),
            Err(SerialError::InvalidGate { .. })
        ));
        assert!(matches!(
            deserialize_operation(
                &gate("rx", vec![ArgRecord::Bool(true)], &["0"]),
                &table
            ),
            Err(SerialError::InvalidGate { .. })
        ));
        assert!(matches!(
            deserialize_operation(&gate("cx", vec![], &["0"]), &table),
            Err(SerialError::Ir(IrError::QubitCountMismatch { .. }))
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_custom_arity_overflow() {
        assert_eq!(custom_arity("u", 3).unwrap(), 3);
        assert!(matches!(
            custom_arity("u", usize::MAX),
            Err(SerialError::InvalidGate { gate, .. }) if gate == "u"
        ));
    }

    #[test]
    fn test_measure_and_tags() {
        let record = OperationRecord::from(MeasureRecord {
            key: "m".into(),
            qubits: vec!["0".into(), "1".into()],
        })
        .with_tags([Tag::name("final")]);
        let op = deserialize_operation(&record, &ConstantTable::new()).unwrap();
        assert_eq!(
            op,
            Operation::measure([Qubit::line(0), Qubit::line(1)], "m")
                .unwrap()
                .with_tags([Tag::name("final")])
        );
    }

    #[test]
    fn test_program_overlap_rejected() {
        let record = ProgramRecord {
            moments: vec![vec![
                gate("x", vec![], &["0"]),
                gate("h", vec![], &["0"]),
            ]],
            tags: vec![],
        };
        assert!(matches!(
            deserialize_program(&record, &ConstantTable::new()),
            Err(SerialError::Ir(IrError::OverlappingOperations { .. }))
        ));
    }
}
