//! Sort command implementation.

use anyhow::Result;
use console::style;
use tracing::debug;

use momenta_compile::{PassManagerBuilder, SortStats};
use momenta_ir::Tag;

use super::common::{default_output, load_program, save_program};

/// Execute the sort command.
pub fn execute(
    input: &str,
    output: Option<&str>,
    deep: bool,
    ignore_tags: &[String],
) -> Result<()> {
    println!(
        "{} Sorting {}{}",
        style("→").cyan().bold(),
        style(input).green(),
        if deep { " (deep)" } else { "" }
    );

    let mut program = load_program(input)?.unfreeze();
    let (pm, mut context) = PassManagerBuilder::new()
        .with_deep(deep)
        .with_tags_to_ignore(ignore_tags.iter().map(|tag| Tag::name(tag.as_str())))
        .build();
    debug!("Ignoring calls tagged {:?}", context.tags_to_ignore());

    pm.run(&mut program, &mut context)?;

    println!("{} Sort complete", style("✓").green().bold());
    if let Some(stats) = context.get::<SortStats>() {
        println!(
            "  Moved {} of {} top-level operations",
            stats.moved, stats.operations
        );
    }
    println!("  Result: {} moments", program.num_moments());

    let output = output.map_or_else(|| default_output(input, "sorted"), str::to_string);
    save_program(&program.into_frozen(), &output)?;
    println!("  Output: {}", style(&output).green());

    Ok(())
}
