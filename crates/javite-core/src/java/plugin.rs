//! The Java integration plugin and its factory.

use super::compose::compose_config;
use super::fallback::fallback_response;
use super::lifecycle::{HotFile, LifecycleRegistry};
use super::options::{resolve_plugin_config, PluginConfig, RawPluginConfig, TsCompiler};
use super::transform::serve_transform;
use super::url::{resolve_dev_server_url, DevServerUrl};
use crate::env::vars;
use crate::error::ConfigError;
use crate::host::{
    Command, ConfigEnv, HookResult, Plugin, PluginContext, PluginEnforce, PluginError,
    ResolvedConfig, ServerContext, TransformResult, UserConfig,
};
use crate::project::java_version;
use crate::version::{PLUGIN_NAME, VERSION};
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

/// Name of the compiler plugin added when `tsCompiler` is `swc`.
pub const SWC_PLUGIN_NAME: &str = "javite:swc";

/// Values one hook learns and later hooks read.
///
/// Each plugin instance owns its own cell, so several servers in one process
/// never see each other's state.
#[derive(Debug, Default)]
pub struct PluginState {
    pinned_origin: OnceLock<Option<String>>,
    resolved: OnceLock<ResolvedConfig>,
    dev_server_url: OnceLock<DevServerUrl>,
}

impl PluginState {
    /// `server.origin` as the user declared it, before composition.
    pub fn pinned_origin(&self) -> Option<&str> {
        self.pinned_origin.get().and_then(Option::as_deref)
    }

    pub fn resolved_config(&self) -> Option<&ResolvedConfig> {
        self.resolved.get()
    }

    /// The dev server URL, once the listener is bound.
    pub fn dev_server_url(&self) -> Option<&DevServerUrl> {
        self.dev_server_url.get()
    }
}

/// Core plugin: composes the config, manages the hot file and rewrites
/// served modules.
pub struct JavaPlugin {
    config: PluginConfig,
    lifecycle: Arc<LifecycleRegistry>,
    state: Arc<PluginState>,
}

impl JavaPlugin {
    pub fn new(config: PluginConfig, lifecycle: Arc<LifecycleRegistry>) -> Self {
        Self {
            config,
            lifecycle,
            state: Arc::new(PluginState::default()),
        }
    }

    pub fn plugin_config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn state(&self) -> &Arc<PluginState> {
        &self.state
    }

    fn error(hook: &'static str, err: impl std::fmt::Display) -> PluginError {
        PluginError::new(PLUGIN_NAME, hook, err.to_string())
    }
}

impl Plugin for JavaPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Post
    }

    fn config(&self, user: &mut UserConfig, env: &ConfigEnv) -> HookResult<()> {
        if self.state.pinned_origin.set(user.server.origin.clone()).is_err() {
            tracing::debug!("origin already pinned for this instance");
        }

        let composed = compose_config(&self.config, user, env.command, &env.env, &env.root)
            .map_err(|e| Self::error("config", e))?;
        tracing::debug!(command = %env.command, base = %composed.base, "composed config");
        composed.apply(user);
        Ok(())
    }

    fn config_resolved(&self, config: &ResolvedConfig) -> HookResult<()> {
        if self.state.resolved.set(config.clone()).is_err() {
            tracing::debug!("config already resolved for this instance");
        }
        Ok(())
    }

    fn configure_server(&self, server: &mut ServerContext) -> HookResult<()> {
        let app_url = server
            .config
            .env
            .get(vars::APP_URL)
            .cloned()
            .unwrap_or_else(|| "undefined".to_string());
        let hot_file = HotFile::new(server.config.root_relative(&self.config.hot_file));

        let state = Arc::clone(&self.state);
        let settings = server.config.server.clone();
        let base = server.config.base.clone();
        let project_root = self
            .config
            .java_project_base
            .as_deref()
            .map_or_else(|| server.root.clone(), |p| server.config.root_relative(p));
        let listening_hot_file = hot_file.clone();
        let resolved_url = server.resolved_url_handle();
        let banner_app_url = app_url.clone();

        server.on_listening(move |address: SocketAddr| {
            let url = match state.pinned_origin() {
                Some(origin) => DevServerUrl::new(origin),
                None => resolve_dev_server_url(address, &settings),
            };
            if state.dev_server_url.set(url.clone()).is_err() {
                tracing::debug!("dev server url already set");
            }

            listening_hot_file
                .write(&url, &base)
                .map_err(|e| {
                    let path = listening_hot_file.path().display();
                    Self::error("configureServer", format!("failed to write hot file {path}: {e}"))
                })?;
            tracing::debug!(path = %listening_hot_file.path().display(), %url, "wrote hot file");
            if resolved_url.set(url.as_str().to_string()).is_err() {
                tracing::debug!("server url already published");
            }

            let probe = java_version(&project_root);
            let java = probe.or_empty();
            tracing::info!(java, plugin = VERSION, "JAVA {java}  plugin v{VERSION}");
            tracing::info!(app_url = %banner_app_url, "➜  APP_URL: {banner_app_url}");
            Ok(())
        });

        let cleanup_hot_file = hot_file;
        let registered = self.lifecycle.register_once(move || {
            tracing::debug!(path = %cleanup_hot_file.path().display(), "cleaning up hot file");
            if let Err(e) = cleanup_hot_file.remove() {
                tracing::warn!(error = %e, "failed to remove hot file");
            }
        });
        if !registered {
            tracing::debug!("exit handlers already bound");
        }

        server.use_middleware("javite:dev-fallback", move |_method, path| {
            fallback_response(path, &app_url)
        });
        Ok(())
    }

    fn transform(
        &self,
        code: &str,
        _id: &str,
        ctx: &PluginContext,
    ) -> HookResult<Option<TransformResult>> {
        if ctx.command != Command::Serve {
            return Ok(None);
        }
        let Some(url) = self.state.dev_server_url() else {
            tracing::debug!("dev server not listening yet, leaving module untouched");
            return Ok(None);
        };
        Ok(Some(TransformResult::code(serve_transform(
            code,
            url,
            &self.config.transform_on_serve,
        ))))
    }
}

/// Descriptor for the SWC compiler plugin. Compilation itself is left to the
/// host; this carries the options through the plugin list.
#[derive(Debug, Clone)]
pub struct SwcPlugin {
    options: serde_json::Value,
}

impl SwcPlugin {
    #[must_use]
    pub fn new(options: serde_json::Value) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &serde_json::Value {
        &self.options
    }
}

impl Plugin for SwcPlugin {
    fn name(&self) -> &str {
        SWC_PLUGIN_NAME
    }
}

/// Build the plugin list for `config`.
///
/// The core plugin comes first; the SWC plugin follows when `tsCompiler` is
/// `swc`. Every instance shares `lifecycle`, so the hot file cleanup is bound
/// once per process.
pub fn java(
    config: Option<RawPluginConfig>,
    lifecycle: Arc<LifecycleRegistry>,
) -> Result<Vec<Box<dyn Plugin>>, ConfigError> {
    let config = resolve_plugin_config(config)?;
    let swc = (config.ts_compiler == TsCompiler::Swc).then(|| SwcPlugin::new(config.swc_options.clone()));

    let mut plugins: Vec<Box<dyn Plugin>> = vec![Box::new(JavaPlugin::new(config, lifecycle))];
    if let Some(swc) = swc {
        tracing::debug!("adding SWC plugin");
        plugins.push(Box::new(swc));
    }
    tracing::debug!(count = plugins.len(), "plugins resolved");
    Ok(plugins)
}
