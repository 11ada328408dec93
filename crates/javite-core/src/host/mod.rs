//! The plugin host: configuration model and plugin seam.
//!
//! The dev server and build pipeline that drive these hooks live outside
//! this crate; the CLI provides a minimal dev host.

pub mod config;
pub mod plugin;

pub use config::{
    AliasConfig, AliasEntry, BuildSettings, Command, ConfigEnv, HmrOptions, HmrSetting,
    HostSetting, HttpsConfig, Input, ManifestSetting, PublicDir, ResolvedConfig, ServerSettings,
    TlsIdentity, UserConfig, DEFAULT_HOST, DEFAULT_PORT,
};
pub use plugin::{
    HookResult, ListeningHook, MiddlewareResponse, Plugin, PluginContainer, PluginContext,
    PluginEnforce, PluginError, ResolvedUrl, ServerContext, ServerMiddleware, TransformResult,
};
