use std::fmt::Write;

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name used for the plugin, its log target and its error prefix.
pub const PLUGIN_NAME: &str = "javite";

/// Returns a formatted version string including build metadata if available.
#[must_use]
pub fn version_string() -> String {
    let mut s = format!("{PLUGIN_NAME} {VERSION}");

    if let Some(hash) = option_env!("JAVITE_BUILD_GIT_HASH") {
        let _ = write!(s, " ({hash})");
    }

    s
}
