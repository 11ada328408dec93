use javite_core::project::read_properties_files;
use javite_core::Config;
use miette::{IntoDiagnostic, Result};

pub fn run(config: &Config, patterns: &[String]) -> Result<()> {
    let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
    let properties = read_properties_files(&patterns, &config.cwd).into_diagnostic()?;
    println!("{}", serde_json::to_string_pretty(&properties).into_diagnostic()?);
    Ok(())
}
