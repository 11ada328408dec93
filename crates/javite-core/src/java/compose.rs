//! Composition of the plugin configuration with the host's user config.
//!
//! Every field follows the same rule: a value the user set explicitly wins,
//! otherwise the plugin supplies its default. Fields are decided
//! independently, so overriding one never changes how another defaults.

use super::options::{PluginConfig, TsCompiler};
use super::tls::{resolve_environment_server_config, EnvServerConfig};
use crate::env::{vars, EnvVars};
use crate::error::{ConfigError, Error};
use crate::host::{
    AliasConfig, AliasEntry, BuildSettings, Command, HmrSetting, HostSetting,
    HttpsConfig, ManifestSetting, PublicDir, ServerSettings, UserConfig, DEFAULT_HOST,
    DEFAULT_PORT,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Placeholder used as `server.origin` until the real origin is known.
pub const ORIGIN_PLACEHOLDER: &str = "__java_vite_placeholder__";

/// Manifest location relative to the output directory.
pub const MANIFEST_PATH: &str = ".vite/manifest.json";

/// Module excluded from dependency pre-bundling.
pub const SWC_CORE_MODULE: &str = "@swc/core";

/// Convenience aliases merged into the user's `resolve.alias`.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[("@", "/src")];

/// The plugin's contribution to the host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedConfig {
    pub base: String,
    pub public_dir: PublicDir,
    pub build: BuildSettings,
    pub server: ServerSettings,
    pub alias: AliasConfig,
    pub optimize_deps_exclude: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub esbuild: Option<serde_json::Value>,
}

impl ComposedConfig {
    /// Write the composition back into the host's user config.
    pub fn apply(self, user: &mut UserConfig) {
        user.base = Some(self.base);
        user.public_dir = Some(self.public_dir);

        user.build.manifest = Some(self.build.manifest);
        user.build.out_dir = Some(self.build.out_dir);
        user.build.rollup_options.input = self.build.input;
        user.build.assets_inline_limit = Some(self.build.assets_inline_limit);

        user.server.origin = self.server.origin;
        user.server.host = Some(self.server.host);
        user.server.port = Some(self.server.port);
        user.server.strict_port = Some(self.server.strict_port);
        user.server.hmr = self.server.hmr;
        user.server.https = self.server.https;

        user.resolve.alias = Some(self.alias);
        user.optimize_deps.exclude = Some(self.optimize_deps_exclude);
        user.esbuild = self.esbuild;
    }
}

/// Production `base`: the asset URL followed by the build directory, ending in
/// exactly one slash.
#[must_use]
pub fn resolve_base(build_directory: &str, asset_url: &str) -> String {
    let separator = if asset_url.ends_with('/') { "" } else { "/" };
    format!("{asset_url}{separator}{build_directory}/")
}

/// Compose `plugin` with `user` for `command`.
///
/// `env` is the loaded environment; certificate paths in it are resolved
/// against `root`. TLS settings are only consulted when serving.
pub fn compose_config(
    plugin: &PluginConfig,
    user: &UserConfig,
    command: Command,
    env: &EnvVars,
    root: &Path,
) -> Result<ComposedConfig, Error> {
    let env_server = match command {
        Command::Serve => resolve_environment_server_config(env, root)?,
        Command::Build => None,
    };

    let base = user.base.clone().unwrap_or_else(|| match command {
        Command::Build => {
            let asset_url = env.get(vars::ASSET_URL).map_or("/", String::as_str);
            resolve_base(&plugin.build_directory, asset_url)
        }
        Command::Serve => String::new(),
    });

    let public_dir = user
        .public_dir
        .clone()
        .unwrap_or_else(|| PublicDir::Path(plugin.public_directory.clone()));

    let build = BuildSettings {
        manifest: user
            .build
            .manifest
            .clone()
            .unwrap_or_else(|| ManifestSetting::Path(MANIFEST_PATH.to_string())),
        out_dir: user
            .build
            .out_dir
            .clone()
            .unwrap_or_else(|| plugin.output_directory.clone()),
        input: Some(
            user.build
                .rollup_options
                .input
                .clone()
                .unwrap_or_else(|| plugin.input.clone()),
        ),
        assets_inline_limit: user.build.assets_inline_limit.unwrap_or(0),
    };

    let esbuild = match plugin.ts_compiler {
        TsCompiler::Swc => Some(serde_json::Value::Bool(false)),
        TsCompiler::Esbuild => user.esbuild.clone(),
    };

    Ok(ComposedConfig {
        base,
        public_dir,
        build,
        server: compose_server(user, env, env_server.as_ref())?,
        alias: compose_alias(user.resolve.alias.as_ref()),
        optimize_deps_exclude: compose_optimize_deps_exclude(user.optimize_deps.exclude.as_deref()),
        esbuild,
    })
}

fn compose_server(
    user: &UserConfig,
    env: &EnvVars,
    env_server: Option<&EnvServerConfig>,
) -> Result<ServerSettings, ConfigError> {
    let port = match user.server.port {
        Some(port) => port,
        None => match env.get(vars::VITE_PORT).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value: value.to_string() })?,
            None => DEFAULT_PORT,
        },
    };

    let host = user.server.host.clone().unwrap_or_else(|| {
        HostSetting::Name(
            env_server.map_or_else(|| DEFAULT_HOST.to_string(), |tls| tls.host.clone()),
        )
    });

    let (hmr, https) = match env_server {
        Some(tls) => {
            let hmr = match &user.server.hmr {
                Some(HmrSetting::Flag(false)) => HmrSetting::Flag(false),
                Some(HmrSetting::Flag(true)) | None => HmrSetting::Options(tls.hmr()),
                Some(HmrSetting::Options(opts)) => HmrSetting::Options(tls.hmr().merged_with(opts)),
            };
            let https = user
                .server
                .https
                .clone()
                .unwrap_or_else(|| HttpsConfig::Identity(tls.https.clone()));
            (Some(hmr), Some(https))
        }
        None => (user.server.hmr.clone(), user.server.https.clone()),
    };

    Ok(ServerSettings {
        origin: Some(
            user.server
                .origin
                .clone()
                .unwrap_or_else(|| ORIGIN_PLACEHOLDER.to_string()),
        ),
        host,
        port,
        strict_port: user.server.strict_port.unwrap_or(true),
        hmr,
        https,
    })
}

/// Add the convenience aliases without displacing anything the user declared.
#[must_use]
pub fn compose_alias(user: Option<&AliasConfig>) -> AliasConfig {
    match user {
        Some(AliasConfig::List(entries)) => {
            let mut entries = entries.clone();
            entries.extend(DEFAULT_ALIASES.iter().map(|(find, replacement)| AliasEntry {
                find: (*find).to_string(),
                replacement: (*replacement).to_string(),
            }));
            AliasConfig::List(entries)
        }
        Some(AliasConfig::Map(map)) => {
            let mut merged = default_alias_map();
            merged.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
            AliasConfig::Map(merged)
        }
        None => AliasConfig::Map(default_alias_map()),
    }
}

fn default_alias_map() -> BTreeMap<String, String> {
    DEFAULT_ALIASES
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// User excludes followed by the compiler runtime, without duplicates.
#[must_use]
pub fn compose_optimize_deps_exclude(user: Option<&[String]>) -> Vec<String> {
    let mut exclude: Vec<String> = Vec::new();
    for module in user.unwrap_or_default().iter().map(String::as_str).chain([SWC_CORE_MODULE]) {
        if !exclude.iter().any(|m| m == module) {
            exclude.push(module.to_string());
        }
    }
    exclude
}
