use javite_core::version::version_string;
use javite_core::{java_version, Config, VersionProbe};
use miette::Result;

pub fn run(config: &Config) -> Result<()> {
    println!("{}", version_string());
    match java_version(&config.cwd) {
        VersionProbe::Detected(version) => println!("java {version}"),
        VersionProbe::Undetected => {}
        VersionProbe::Failed(reason) => tracing::debug!(%reason, "java version probe failed"),
    }
    Ok(())
}
