#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod config_file;
pub mod env;
pub mod error;
pub mod host;
pub mod java;
pub mod project;
pub mod session;
pub mod version;

pub use config::Config;
pub use error::{ConfigError, Error, TlsConfigError};
pub use java::{java, DevServerUrl, LifecycleRegistry, PluginOptions, RawPluginConfig};
pub use project::{java_version, VersionProbe};
pub use session::{start_session, Session};
pub use version::VERSION;
