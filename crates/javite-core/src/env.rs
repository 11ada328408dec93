//! `.env` file loading.
//!
//! Mirrors Vite's `loadEnv`: `.env`, `.env.local`, `.env.[mode]` and
//! `.env.[mode].local` are read in that order with later files overriding
//! earlier ones, and variables already present in the process environment
//! override anything read from disk.

use std::collections::HashMap;
use std::path::Path;

/// Environment variables visible to the plugin.
pub type EnvVars = HashMap<String, String>;

/// Names of the environment variables the plugin consumes.
pub mod vars {
    /// Prefix prepended to the build directory in the production `base`.
    pub const ASSET_URL: &str = "ASSET_URL";
    /// Dev server port.
    pub const VITE_PORT: &str = "VITE_PORT";
    /// Path to the dev server TLS private key.
    pub const VITE_DEV_SERVER_KEY: &str = "VITE_DEV_SERVER_KEY";
    /// Path to the dev server TLS certificate.
    pub const VITE_DEV_SERVER_CERT: &str = "VITE_DEV_SERVER_CERT";
    /// Public URL of the Java application.
    pub const APP_URL: &str = "APP_URL";
}

/// Parse a `.env` file's contents into key-value pairs.
///
/// Supports:
/// - `KEY=value` (unquoted, ` #` starts an inline comment)
/// - `KEY="value"` (double-quoted, with escape sequences)
/// - `KEY='value'` (single-quoted, literal)
/// - an optional `export ` prefix
///
/// Comments (`#`) and blank lines are skipped.
#[must_use]
pub fn parse_env_file(content: &str) -> EnvVars {
    let mut env = EnvVars::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, raw_value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        let key = key.strip_prefix("export ").unwrap_or(key).trim();
        if key.is_empty() {
            continue;
        }

        env.insert(key.to_string(), parse_value(raw_value.trim()));
    }

    env
}

fn parse_value(raw: &str) -> String {
    if let Some(inner) = raw.strip_prefix('"') {
        let mut value = String::new();
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '"' => break,
                '\\' => match chars.next() {
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some('t') => value.push('\t'),
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => {}
                },
                _ => value.push(c),
            }
        }
        value
    } else if let Some(inner) = raw.strip_prefix('\'') {
        inner.split('\'').next().unwrap_or_default().to_string()
    } else if let Some(pos) = raw.find(" #") {
        raw[..pos].trim_end().to_string()
    } else {
        raw.to_string()
    }
}

/// Load the `.env` files of `root` for `mode`, without consulting the process
/// environment.
#[must_use]
pub fn load_env_files(root: &Path, mode: &str) -> EnvVars {
    let files = [
        root.join(".env"),
        root.join(".env.local"),
        root.join(format!(".env.{mode}")),
        root.join(format!(".env.{mode}.local")),
    ];

    let mut env = EnvVars::new();
    for file in &files {
        if let Ok(content) = std::fs::read_to_string(file) {
            env.extend(parse_env_file(&content));
        }
    }
    env
}

/// Load the environment for `mode`: `.env` files overlaid with the process
/// environment.
#[must_use]
pub fn load_env(root: &Path, mode: &str) -> EnvVars {
    let mut env = load_env_files(root, mode);
    env.extend(std::env::vars());
    env
}
