use std::path::PathBuf;
use thiserror::Error;

/// Invalid or missing plugin configuration.
///
/// Raised synchronously while normalizing plugin options or composing the
/// host configuration. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("javite: missing configuration.")]
    Missing,

    #[error("javite: missing configuration for \"input\".")]
    MissingInput,

    #[error("javite: \"publicDirectory\" must be a subdirectory. E.g. 'public'.")]
    InvalidPublicDirectory,

    #[error("javite: \"buildDirectory\" must be a subdirectory. E.g. 'build'.")]
    InvalidBuildDirectory,

    #[error("javite: invalid dev server port in VITE_PORT: [{value}].")]
    InvalidPort { value: String },
}

/// Inconsistent TLS configuration declared through the environment.
#[derive(Error, Debug)]
pub enum TlsConfigError {
    #[error(
        "javite: unable to find the certificate files specified in your environment. \
         Ensure you have correctly configured VITE_DEV_SERVER_KEY: [{key}] and VITE_DEV_SERVER_CERT: [{cert}]."
    )]
    MissingCertificateFiles { key: String, cert: String },

    #[error("javite: failed to read certificate file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `APP_URL` is not an absolute URL with a host. Only its host name is
    /// used; any port in it is ignored.
    #[error("javite: unable to determine the host from the environment's APP_URL: [{url}].")]
    InvalidAppUrl { url: String },
}

/// Result alias for javite operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for javite operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tls(#[from] TlsConfigError),

    #[error(transparent)]
    Plugin(#[from] crate::host::PluginError),

    #[error("Invalid glob pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
