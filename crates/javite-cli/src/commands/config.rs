use javite_core::host::Command;
use javite_core::{start_session, Config, LifecycleRegistry};
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;

/// Print the resolved configuration for `command` as JSON on stdout.
pub fn run(config: &Config, command: Command, mode: &str) -> Result<()> {
    let session = start_session(config, command, mode, Arc::new(LifecycleRegistry::new()))
        .into_diagnostic()?;

    let output = serde_json::json!({
        "configFile": session.config_path,
        "plugins": session.plugins.names(),
        "config": session.config,
    });
    println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    Ok(())
}
