use anyhow::{bail, Result};

use super::{load_inventory, print_inventory_stats, CheckArgs};

pub(crate) fn run_check(args: CheckArgs) -> Result<()> {
    let inventory = load_inventory(&args.r#in)?;
    let findings = inventory.audit();

    print_inventory_stats(&inventory);

    if findings.is_empty() {
        println!("No problems found.");
        return Ok(());
    }

    println!("\nProblems found: {}", findings.len());
    for finding in &findings {
        println!("  ERROR: {}", finding);
    }

    bail!("check: {} problem(s) found", findings.len())
}
