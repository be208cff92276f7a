//! Num command implementation.

use crate::policy_args::PolicyArgs;

pub fn run(show_policy: bool, args: &PolicyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let policy = args.resolve()?;

    if !show_policy {
        println!("No numeric subcommand executed. Use '--show-policy' to inspect settings.");
        std::process::exit(1);
    }

    // serde_json's map is ordered, so keys come out sorted.
    let snapshot = serde_json::to_value(policy.snapshot())?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
