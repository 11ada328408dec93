//! Host configuration: what the user declares and what the host resolves.
//!
//! [`UserConfig`] is the `vite.config`-shaped user input where every field is
//! optional. Plugins mutate it in their `config` hook; the host then turns it
//! into a [`ResolvedConfig`] by filling in its own defaults.

use crate::env::EnvVars;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Default dev server port.
pub const DEFAULT_PORT: u16 = 5173;

/// Default dev server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Host default for `build.assetsInlineLimit`.
pub const DEFAULT_ASSETS_INLINE_LIMIT: u64 = 4096;

/// Which host command is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Production build.
    Build,
    /// Development server.
    Serve,
}

impl Command {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Serve => "serve",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry points handed to the bundler: one path, a list, or `alias → path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Input {
    Single(String),
    Many(Vec<String>),
    Named(BTreeMap<String, String>),
}

impl Input {
    /// Whether no entry point is declared at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(path) => path.trim().is_empty(),
            Self::Many(paths) => paths.is_empty(),
            Self::Named(entries) => entries.is_empty(),
        }
    }
}

impl From<&str> for Input {
    fn from(path: &str) -> Self {
        Self::Single(path.to_string())
    }
}

/// `publicDir`: a directory, or `false` to disable public-directory copying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicDir {
    Flag(bool),
    Path(String),
}

/// `build.manifest`: on/off, or a custom manifest path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestSetting {
    Flag(bool),
    Path(String),
}

/// `server.host`: a host name, or `true` to listen on all addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostSetting {
    Flag(bool),
    Name(String),
}

impl HostSetting {
    /// The declared host name, if this is the string form.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Flag(_) => None,
        }
    }
}

/// HMR client options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HmrOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl HmrOptions {
    /// Overlay `other` on top of `self`: fields set in `other` win.
    #[must_use]
    pub fn merged_with(mut self, other: &HmrOptions) -> Self {
        if other.protocol.is_some() {
            self.protocol.clone_from(&other.protocol);
        }
        if other.host.is_some() {
            self.host.clone_from(&other.host);
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.client_port.is_some() {
            self.client_port = other.client_port;
        }
        if other.path.is_some() {
            self.path.clone_from(&other.path);
        }
        self
    }
}

/// `server.hmr`: on/off, or explicit client options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HmrSetting {
    Flag(bool),
    Options(HmrOptions),
}

impl HmrSetting {
    /// The explicit options, if this is the object form.
    #[must_use]
    pub fn options(&self) -> Option<&HmrOptions> {
        match self {
            Self::Options(opts) => Some(opts),
            Self::Flag(_) => None,
        }
    }
}

/// PEM key and certificate bytes.
///
/// Serializes as byte counts so resolved configs can be printed without
/// leaking key material.
#[derive(Clone, PartialEq, Eq)]
pub struct TlsIdentity {
    pub key: Vec<u8>,
    pub cert: Vec<u8>,
}

impl fmt::Debug for TlsIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsIdentity")
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .field("cert", &format_args!("<{} bytes>", self.cert.len()))
            .finish()
    }
}

impl Serialize for TlsIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("TlsIdentity", 2)?;
        s.serialize_field("key", &format!("<{} bytes>", self.key.len()))?;
        s.serialize_field("cert", &format!("<{} bytes>", self.cert.len()))?;
        s.end()
    }
}

/// `server.https`: on/off, key/cert paths, or already-loaded key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HttpsConfig {
    Flag(bool),
    Files {
        key: PathBuf,
        cert: PathBuf,
    },
    #[serde(skip_deserializing)]
    Identity(TlsIdentity),
}

impl HttpsConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Flag(false))
    }
}

/// A single list-form alias entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub find: String,
    pub replacement: String,
}

/// `resolve.alias`: a map, or an ordered list of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AliasConfig {
    Map(BTreeMap<String, String>),
    List(Vec<AliasEntry>),
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self::Map(BTreeMap::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollupOptions {
    pub input: Option<Input>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserBuildConfig {
    pub manifest: Option<ManifestSetting>,
    pub out_dir: Option<String>,
    pub rollup_options: RollupOptions,
    pub assets_inline_limit: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserServerConfig {
    pub origin: Option<String>,
    pub host: Option<HostSetting>,
    pub port: Option<u16>,
    pub strict_port: Option<bool>,
    pub hmr: Option<HmrSetting>,
    pub https: Option<HttpsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserResolveConfig {
    pub alias: Option<AliasConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserOptimizeDeps {
    pub exclude: Option<Vec<String>>,
}

/// User configuration as declared in the project config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserConfig {
    pub base: Option<String>,
    pub public_dir: Option<PublicDir>,
    pub env_dir: Option<PathBuf>,
    pub build: UserBuildConfig,
    pub server: UserServerConfig,
    pub resolve: UserResolveConfig,
    pub optimize_deps: UserOptimizeDeps,
    pub esbuild: Option<serde_json::Value>,
}

/// Build settings after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSettings {
    pub manifest: ManifestSetting,
    pub out_dir: String,
    pub input: Option<Input>,
    pub assets_inline_limit: u64,
}

/// Dev server settings after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    pub origin: Option<String>,
    pub host: HostSetting,
    pub port: u16,
    pub strict_port: bool,
    pub hmr: Option<HmrSetting>,
    pub https: Option<HttpsConfig>,
}

impl ServerSettings {
    /// Whether the server itself is configured to terminate TLS.
    #[must_use]
    pub fn https_enabled(&self) -> bool {
        self.https.as_ref().is_some_and(HttpsConfig::is_enabled)
    }
}

/// Environment handed to `config` hooks.
#[derive(Debug, Clone)]
pub struct ConfigEnv {
    pub command: Command,
    pub mode: String,
    /// Project root; relative paths in the config resolve against it.
    pub root: PathBuf,
    pub env: EnvVars,
}

/// Final configuration after every plugin's `config` hook ran.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub command: Command,
    pub mode: String,
    pub root: PathBuf,
    #[serde(skip)]
    pub env: EnvVars,
    pub base: String,
    pub public_dir: PublicDir,
    pub build: BuildSettings,
    pub server: ServerSettings,
    pub alias: AliasConfig,
    pub optimize_deps_exclude: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub esbuild: Option<serde_json::Value>,
}

impl ResolvedConfig {
    /// Resolve `user` by applying host defaults to everything left unset.
    #[must_use]
    pub fn resolve(user: UserConfig, env: ConfigEnv) -> Self {
        let UserConfig {
            base,
            public_dir,
            build,
            server,
            resolve,
            optimize_deps,
            esbuild,
            ..
        } = user;

        Self {
            command: env.command,
            mode: env.mode,
            root: env.root,
            env: env.env,
            base: base.unwrap_or_else(|| "/".to_string()),
            public_dir: match public_dir {
                Some(PublicDir::Flag(true)) | None => PublicDir::Path("public".to_string()),
                Some(other) => other,
            },
            build: BuildSettings {
                manifest: build.manifest.unwrap_or(ManifestSetting::Flag(false)),
                out_dir: build.out_dir.unwrap_or_else(|| "dist".to_string()),
                input: build.rollup_options.input,
                assets_inline_limit: build
                    .assets_inline_limit
                    .unwrap_or(DEFAULT_ASSETS_INLINE_LIMIT),
            },
            server: ServerSettings {
                origin: server.origin,
                host: server
                    .host
                    .unwrap_or_else(|| HostSetting::Name(DEFAULT_HOST.to_string())),
                port: server.port.unwrap_or(DEFAULT_PORT),
                strict_port: server.strict_port.unwrap_or(false),
                hmr: server.hmr,
                https: server.https,
            },
            alias: resolve.alias.unwrap_or_default(),
            optimize_deps_exclude: optimize_deps.exclude.unwrap_or_default(),
            esbuild,
        }
    }

    /// Resolve a possibly relative path against the project root.
    #[must_use]
    pub fn root_relative(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}
