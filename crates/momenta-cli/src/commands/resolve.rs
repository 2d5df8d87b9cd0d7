//! Resolve command implementation.

use anyhow::{Context, Result};
use console::style;
use serde::Deserialize;
use tracing::info;

use momenta_ir::{FrozenProgram, InsertStrategy};
use momenta_serial::{ConstantRecord, ConstantTable, OperationRecord, deserialize_batch};
use momenta_work::build_pool;

use super::common::{default_output, read_file, save_program};

/// A serialized constant table plus the operations that read from it.
#[derive(Debug, Deserialize)]
pub struct ResolveInput {
    #[serde(default)]
    pub constants: Vec<ConstantRecord>,
    #[serde(default)]
    pub operations: Vec<OperationRecord>,
}

/// Execute the resolve command.
pub fn execute(input: &str, output: Option<&str>, threads: Option<usize>) -> Result<()> {
    println!(
        "{} Resolving {}",
        style("→").cyan().bold(),
        style(input).green()
    );

    let source = read_file(input)?;
    let parsed: ResolveInput =
        serde_json::from_str(&source).with_context(|| format!("Failed to parse {input}"))?;

    let table = ConstantTable::resolve(&parsed.constants).context("Failed to resolve constants")?;
    println!("  Constants: {}", table.len());

    let pool = threads.map(build_pool).transpose()?;
    info!(
        "Decoding operations with {} threads",
        pool.as_ref().map_or(1, |pool| pool.current_num_threads())
    );
    let operations = deserialize_batch(&parsed.operations, &table, pool.as_ref())
        .context("Failed to decode operations")?;

    let program = FrozenProgram::new(operations, InsertStrategy::Earliest);
    println!("{} Resolved", style("✓").green().bold());
    println!(
        "  Result: {} operations in {} moments",
        program.operation_count(),
        program.num_moments()
    );

    let output = output.map_or_else(|| default_output(input, "resolved"), str::to_string);
    save_program(&program, &output)?;
    println!("  Output: {}", style(&output).green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::load_program;

    #[test]
    fn test_resolve_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("table.json");
        let output = dir.path().join("out.json");
        std::fs::write(
            &input,
            r#"{
                "constants": [
                    {"program": {"moments": [[{"kind": {"gate": {"name": "h", "qubits": ["0"]}}}]]}}
                ],
                "operations": [
                    {"kind": {"sub_program_call": {"constant_index": 0, "operand_map": [["0", "1"]]}}},
                    {"kind": {"measure": {"key": "m", "qubits": ["1"]}}}
                ]
            }"#,
        )
        .unwrap();

        execute(
            input.to_str().unwrap(),
            Some(output.to_str().unwrap()),
            Some(2),
        )
        .unwrap();

        let program = load_program(output.to_str().unwrap()).unwrap();
        assert_eq!(program.num_moments(), 2);
        assert!(program.measurement_keys().contains("m"));
    }
}
