//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - moment-based quantum program tooling",
        style("Momenta").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  momenta-ir       Moment-based program representation");
    println!("  momenta-compile  Pass framework and commutation-aware sort");
    println!("  momenta-serial   Constant-table decoding and persistence");
    println!("  momenta-work     Parallel map with progress reporting");
    println!("  momenta-cli      Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
