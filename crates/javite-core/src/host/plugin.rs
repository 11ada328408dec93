//! Plugin seam between the host and the plugins it runs.
//!
//! Mirrors the subset of Vite's plugin interface the Java integration needs:
//! `config`, `configResolved`, `configureServer` and `transform`.
//!
//! ## Example
//!
//! ```ignore
//! use javite_core::host::{HookResult, Plugin, PluginContext, TransformResult};
//!
//! struct Banner;
//!
//! impl Plugin for Banner {
//!     fn name(&self) -> &str { "banner" }
//!
//!     fn transform(&self, code: &str, _id: &str, _ctx: &PluginContext) -> HookResult<Option<TransformResult>> {
//!         Ok(Some(TransformResult::code(format!("/* built by javite */\n{code}"))))
//!     }
//! }
//! ```

use super::config::{Command, ConfigEnv, ResolvedConfig, UserConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Result type for plugin hooks.
pub type HookResult<T> = Result<T, PluginError>;

/// Error from a plugin.
#[derive(Debug)]
pub struct PluginError {
    /// Plugin name that caused the error.
    pub plugin: String,
    /// Hook that failed.
    pub hook: &'static str,
    /// Error message.
    pub message: String,
}

impl PluginError {
    pub fn new(plugin: impl Into<String>, hook: &'static str, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.plugin, self.hook, self.message)
    }
}

impl std::error::Error for PluginError {}

/// Context passed to per-module hooks.
#[derive(Debug, Clone)]
pub struct PluginContext {
    /// Project root.
    pub root: PathBuf,
    /// Command being run.
    pub command: Command,
}

impl PluginContext {
    pub fn new(root: PathBuf, command: Command) -> Self {
        Self { root, command }
    }
}

/// Result of transform hook.
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// Transformed code.
    pub code: String,
    /// Optional source map.
    pub map: Option<String>,
}

impl TransformResult {
    /// Create a transform result with code only.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            map: None,
        }
    }
}

/// Plugin enforcement ordering, mirroring Vite's `enforce` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PluginEnforce {
    /// Runs before normal plugins.
    Pre,
    /// Default ordering.
    #[default]
    Normal,
    /// Runs after normal plugins.
    Post,
}

/// Response from a middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiddlewareResponse {
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header.
    pub content_type: String,
    /// Response body.
    pub body: String,
}

/// A middleware function registered by a plugin.
///
/// Receives the request method and path. Returning `Some` ends the request;
/// `None` passes it on.
pub struct ServerMiddleware {
    /// Name for debugging.
    pub name: String,
    /// The handler function.
    pub handler: Arc<dyn Fn(&str, &str) -> Option<MiddlewareResponse> + Send + Sync>,
}

/// Callback fired once the dev server listener is bound.
pub type ListeningHook = Box<dyn FnOnce(SocketAddr) -> HookResult<()> + Send + Sync>;

/// Public URL of the dev server, published once by a listening hook.
pub type ResolvedUrl = Arc<OnceLock<String>>;

/// Context for the dev server, passed to the `configure_server` hook.
pub struct ServerContext {
    /// Project root.
    pub root: PathBuf,
    /// Resolved configuration.
    pub config: ResolvedConfig,
    /// Middlewares, consulted in registration order before the host's own handlers.
    pub middlewares: Vec<ServerMiddleware>,
    listening: Vec<ListeningHook>,
    resolved_url: ResolvedUrl,
}

impl ServerContext {
    pub fn new(config: ResolvedConfig) -> Self {
        Self {
            root: config.root.clone(),
            config,
            middlewares: Vec::new(),
            listening: Vec::new(),
            resolved_url: ResolvedUrl::default(),
        }
    }

    /// Register a middleware.
    pub fn use_middleware(
        &mut self,
        name: impl Into<String>,
        handler: impl Fn(&str, &str) -> Option<MiddlewareResponse> + Send + Sync + 'static,
    ) {
        self.middlewares.push(ServerMiddleware {
            name: name.into(),
            handler: Arc::new(handler),
        });
    }

    /// Run `hook` once the listener reports it is listening.
    pub fn on_listening(
        &mut self,
        hook: impl FnOnce(SocketAddr) -> HookResult<()> + Send + Sync + 'static,
    ) {
        self.listening.push(Box::new(hook));
    }

    /// Fire the listening hooks. Each hook runs at most once.
    pub fn notify_listening(&mut self, addr: SocketAddr) -> HookResult<()> {
        for hook in std::mem::take(&mut self.listening) {
            hook(addr)?;
        }
        Ok(())
    }

    /// Handle a listening hook uses to publish the URL the server advertises.
    pub fn resolved_url_handle(&self) -> ResolvedUrl {
        Arc::clone(&self.resolved_url)
    }

    /// The advertised URL, once a listening hook published it.
    pub fn resolved_url(&self) -> Option<&str> {
        self.resolved_url.get().map(String::as_str)
    }

    /// Offer a request to the middlewares in order.
    pub fn handle_request(&self, method: &str, path: &str) -> Option<MiddlewareResponse> {
        self.middlewares
            .iter()
            .find_map(|middleware| (middleware.handler)(method, path))
    }
}

/// The plugin trait.
///
/// Every hook has a default no-op implementation, so plugins only implement
/// what they need.
pub trait Plugin: Send + Sync {
    /// Plugin name for debugging and error messages.
    fn name(&self) -> &str;

    /// Plugin ordering: `Pre`, `Normal` (default), or `Post`.
    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Normal
    }

    /// Modify the user config before it is resolved.
    fn config(&self, _config: &mut UserConfig, _env: &ConfigEnv) -> HookResult<()> {
        Ok(())
    }

    /// Called after config is resolved (read-only).
    fn config_resolved(&self, _config: &ResolvedConfig) -> HookResult<()> {
        Ok(())
    }

    /// Configure the dev server: add middlewares and listening hooks.
    fn configure_server(&self, _server: &mut ServerContext) -> HookResult<()> {
        Ok(())
    }

    /// Transform module source code.
    ///
    /// Return `Some(result)` to transform the code, or `None` to pass it through.
    fn transform(
        &self,
        _code: &str,
        _id: &str,
        _ctx: &PluginContext,
    ) -> HookResult<Option<TransformResult>> {
        Ok(None)
    }
}

/// A container for managing multiple plugins.
///
/// Plugins are kept sorted by `enforce()`: `Pre` → `Normal` → `Post`.
/// Within the same level, insertion order is preserved.
pub struct PluginContainer {
    plugins: Vec<Box<dyn Plugin>>,
    ctx: PluginContext,
}

impl PluginContainer {
    pub fn new(root: PathBuf, command: Command) -> Self {
        Self {
            plugins: Vec::new(),
            ctx: PluginContext::new(root, command),
        }
    }

    /// Add a plugin.
    pub fn add(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
        self.plugins.sort_by_key(|p| p.enforce());
    }

    /// Add several plugins, preserving their order.
    pub fn extend(&mut self, plugins: impl IntoIterator<Item = Box<dyn Plugin>>) {
        for plugin in plugins {
            self.add(plugin);
        }
    }

    /// Plugin names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    /// Call `config` on all plugins, letting each mutate the config.
    pub fn call_config(&self, config: &mut UserConfig, env: &ConfigEnv) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.config(config, env)?;
        }
        Ok(())
    }

    /// Call `config_resolved` on all plugins.
    pub fn call_config_resolved(&self, config: &ResolvedConfig) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.config_resolved(config)?;
        }
        Ok(())
    }

    /// Call `configure_server` on all plugins.
    pub fn call_configure_server(&self, server: &mut ServerContext) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.configure_server(server)?;
        }
        Ok(())
    }

    /// Transform code through all plugins, each one receiving the previous output.
    pub fn transform(&self, code: &str, id: &str) -> HookResult<String> {
        let mut current = code.to_string();
        for plugin in &self.plugins {
            if let Some(result) = plugin.transform(&current, id, &self.ctx)? {
                current = result.code;
            }
        }
        Ok(current)
    }
}
