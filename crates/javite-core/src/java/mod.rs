//! Java backend integration.
//!
//! Normalizes plugin options, composes them with the host configuration,
//! resolves the dev server URL and keeps the hot file in sync with the
//! server's lifetime.

pub mod compose;
pub mod fallback;
pub mod lifecycle;
pub mod options;
pub mod plugin;
pub mod tls;
pub mod transform;
pub mod url;

pub use compose::{compose_config, resolve_base, ComposedConfig, ORIGIN_PLACEHOLDER};
pub use fallback::{fallback_response, render_fallback_page};
pub use lifecycle::{ExitSignal, HotFile, LifecycleRegistry};
pub use options::{
    resolve_plugin_config, PluginConfig, PluginOptions, RawPluginConfig, TransformOnServe,
    TsCompiler,
};
pub use plugin::{java, JavaPlugin, PluginState, SwcPlugin};
pub use tls::{resolve_environment_server_config, EnvServerConfig};
pub use transform::serve_transform;
pub use url::{resolve_dev_server_url, DevServerUrl};
