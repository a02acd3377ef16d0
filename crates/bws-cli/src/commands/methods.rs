use std::error::Error;
use std::io::Write;

use bws_score::{MethodRegistry, DEFAULT_METHODS};
use clap::Args;

#[derive(Args, Debug)]
pub struct MethodsArgs {
    /// Print names only, one per line.
    #[arg(long)]
    pub names_only: bool,
}

pub fn run(args: &MethodsArgs) -> Result<(), Box<dyn Error>> {
    let registry = MethodRegistry::standard();
    let mut stdout = std::io::stdout().lock();
    for entry in registry.entries() {
        if args.names_only {
            writeln!(stdout, "{}", entry.name)?;
            continue;
        }
        let marker = if DEFAULT_METHODS.contains(&entry.name.as_str()) { "*" } else { " " };
        writeln!(stdout, "{marker} {:<15} {}", entry.name.as_str(), entry.description)?;
    }
    if !args.names_only {
        writeln!(stdout, "\n* computed by `bws score` when --methods is omitted")?;
    }
    Ok(())
}
