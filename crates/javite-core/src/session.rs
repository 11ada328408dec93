//! Project session: config file, environment and plugins, resolved together.
//!
//! Runs the same sequence a host bundler runs before serving or building:
//! load the project config, instantiate the Java plugins, run `config`, resolve
//! the host defaults and run `configResolved`.

use crate::config::Config;
use crate::config_file::load_project_config;
use crate::env::load_env;
use crate::error::Result;
use crate::host::{Command, ConfigEnv, Input, PluginContainer, ResolvedConfig};
use crate::java::{java, LifecycleRegistry, PluginOptions, RawPluginConfig};
use crate::project::{create_rollup_input_config, DEFAULT_INPUT_BASE};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A resolved project, ready to serve or build.
pub struct Session {
    /// Plugins in execution order.
    pub plugins: PluginContainer,
    /// Configuration after every plugin ran.
    pub config: ResolvedConfig,
    /// The project config file that was loaded, if any.
    pub config_path: Option<PathBuf>,
}

/// Resolve the project at `config.cwd` for `command` in `mode`.
///
/// Without `java` options in the config file, entry points are discovered
/// under `src/**/main.ts`.
pub fn start_session(
    config: &Config,
    command: Command,
    mode: &str,
    lifecycle: Arc<LifecycleRegistry>,
) -> Result<Session> {
    let root = config.cwd.clone();

    let (config_path, project) = match load_project_config(&root, config.config_file())? {
        Some((path, project)) => {
            tracing::debug!(path = %path.display(), "loaded project config");
            (Some(path), project)
        }
        None => (None, Default::default()),
    };

    let raw = match project.java {
        Some(RawPluginConfig::Options(options)) if options.input.is_none() => {
            Some(RawPluginConfig::Options(PluginOptions {
                input: discover_input(&root)?,
                ..options
            }))
        }
        Some(raw) => Some(raw),
        None => discover_input(&root)?.map(RawPluginConfig::Input),
    };

    let env_root = project
        .user
        .env_dir
        .as_ref()
        .map_or_else(|| root.clone(), |dir| root.join(dir));
    let env = load_env(&env_root, mode);

    let mut plugins = PluginContainer::new(root.clone(), command);
    plugins.extend(java(raw, lifecycle)?);

    let config_env = ConfigEnv {
        command,
        mode: mode.to_string(),
        root,
        env,
    };
    let mut user = project.user;
    plugins.call_config(&mut user, &config_env)?;

    let resolved = ResolvedConfig::resolve(user, config_env);
    plugins.call_config_resolved(&resolved)?;

    Ok(Session {
        plugins,
        config: resolved,
        config_path,
    })
}

fn discover_input(root: &std::path::Path) -> Result<Option<Input>> {
    let discovered = create_rollup_input_config(&[], DEFAULT_INPUT_BASE, root)?;
    if discovered.is_empty() {
        return Ok(None);
    }
    tracing::debug!(count = discovered.len(), "discovered entry points");
    let named: BTreeMap<String, String> = discovered
        .into_iter()
        .map(|(alias, path)| (alias, path.to_string_lossy().into_owned()))
        .collect();
    Ok(Some(Input::Named(named)))
}
