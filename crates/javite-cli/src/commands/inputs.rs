use javite_core::project::create_rollup_input_config;
use javite_core::Config;
use miette::{IntoDiagnostic, Result};

/// Print `alias → path` entry points as JSON. No patterns means the default.
pub fn run(config: &Config, patterns: &[String], base: &str) -> Result<()> {
    let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
    let inputs = create_rollup_input_config(&patterns, base, &config.cwd).into_diagnostic()?;
    println!("{}", serde_json::to_string_pretty(&inputs).into_diagnostic()?);
    Ok(())
}
