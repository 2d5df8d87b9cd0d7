//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use momenta_ir::FrozenProgram;
use momenta_serial::{from_json, to_json};

/// Load a persisted program from a JSON file.
pub fn load_program(path: &str) -> Result<FrozenProgram> {
    let source = read_file(path)?;
    from_json(&source).with_context(|| format!("Failed to load program from {path}"))
}

/// Persist a program as JSON to `path`.
pub fn save_program(program: &FrozenProgram, path: &str) -> Result<()> {
    let json = to_json(program).context("Failed to persist program")?;
    fs::write(path, json).with_context(|| format!("Failed to write file: {path}"))
}

/// Read a whole file as text.
pub fn read_file(path: &str) -> Result<String> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))
}

/// The output path used when none is given: `<stem>_<suffix>.json` next to the input.
pub fn default_output(input: &str, suffix: &str) -> String {
    let path = Path::new(input);
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    path.with_file_name(format!("{stem}_{suffix}.json"))
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use momenta_ir::{InsertStrategy, Operation, Qubit, StandardGate, Tag};

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bell.json");
        let path = path.to_str().unwrap();

        let program = FrozenProgram::new(
            [
                Operation::gate(StandardGate::H, [Qubit::line(0)]).unwrap(),
                Operation::gate(StandardGate::CX, [Qubit::line(0), Qubit::line(1)]).unwrap(),
            ],
            InsertStrategy::Earliest,
        )
        .with_tags([Tag::name("bell")]);

        save_program(&program, path).unwrap();
        assert_eq!(load_program(path).unwrap(), program);
    }

    #[test]
    fn test_missing_file() {
        let err = load_program("/nonexistent/program.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_default_output() {
        assert_eq!(default_output("dir/prog.json", "sorted"), "dir/prog_sorted.json");
        assert_eq!(default_output("prog", "resolved"), "prog_resolved.json");
    }
}
