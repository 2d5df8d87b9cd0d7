//! Inspect command implementation.

use anyhow::Result;
use console::style;

use super::common::load_program;

/// Execute the inspect command.
pub fn execute(input: &str, show_moments: bool) -> Result<()> {
    let program = load_program(input)?;

    println!(
        "{} {}",
        style("Program").cyan().bold(),
        style(input).green()
    );
    println!("  Moments:      {}", program.num_moments());
    println!("  Operations:   {}", program.operation_count());
    println!("  Qubits:       {}", join(program.qubits()));
    println!("  Measurements: {}", join(program.measurement_keys()));
    if !program.control_keys().is_empty() {
        println!("  Reads:        {}", join(program.control_keys()));
    }
    if program.is_parameterized() {
        println!("  Parameters:   {}", join(program.parameter_names()));
    }
    println!("  Unitary:      {}", program.has_unitary());
    println!(
        "  Terminal measurements: {}",
        program.are_all_measurements_terminal()
    );
    if !program.tags().is_empty() {
        println!("  Tags:         {}", join(program.tags()));
    }
    println!(
        "  Hash:         {}",
        style(format!("{:016x}", program.structural_hash())).dim()
    );

    if show_moments {
        println!();
        println!("{program}");
    }

    Ok(())
}

fn join<T: std::fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    let items: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
