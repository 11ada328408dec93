//! TLS settings declared through the environment.
//!
//! `VITE_DEV_SERVER_KEY` and `VITE_DEV_SERVER_CERT` point at PEM files; the
//! host name comes from `APP_URL`. Partial configuration is an error rather
//! than silently serving plain HTTP.

use crate::env::{vars, EnvVars};
use crate::error::TlsConfigError;
use crate::host::{HmrOptions, TlsIdentity};
use std::path::{Path, PathBuf};

/// Server settings derived from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvServerConfig {
    /// Host the HMR client should connect to.
    pub hmr_host: String,
    /// Host the dev server should advertise.
    pub host: String,
    /// Key and certificate material.
    pub https: TlsIdentity,
}

impl EnvServerConfig {
    /// HMR options carrying the environment host.
    #[must_use]
    pub fn hmr(&self) -> HmrOptions {
        HmrOptions {
            host: Some(self.hmr_host.clone()),
            ..Default::default()
        }
    }
}

/// Resolve TLS settings from `env`. Relative certificate paths are resolved
/// against `root`.
///
/// Returns `Ok(None)` when neither the key nor the certificate is declared.
pub fn resolve_environment_server_config(
    env: &EnvVars,
    root: &Path,
) -> Result<Option<EnvServerConfig>, TlsConfigError> {
    let declared = |name: &str| env.get(name).filter(|v| !v.is_empty()).cloned();
    let key = declared(vars::VITE_DEV_SERVER_KEY);
    let cert = declared(vars::VITE_DEV_SERVER_CERT);

    if key.is_none() && cert.is_none() {
        return Ok(None);
    }

    let resolve = |p: &str| -> PathBuf {
        let path = Path::new(p);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    };

    let (key_path, cert_path) = match (&key, &cert) {
        (Some(k), Some(c)) if resolve(k).exists() && resolve(c).exists() => (resolve(k), resolve(c)),
        _ => {
            return Err(TlsConfigError::MissingCertificateFiles {
                key: key.clone().unwrap_or_default(),
                cert: cert.clone().unwrap_or_default(),
            })
        }
    };

    let host = resolve_host_from_env(env).ok_or_else(|| TlsConfigError::InvalidAppUrl {
        url: env
            .get(vars::APP_URL)
            .cloned()
            .unwrap_or_else(|| "undefined".to_string()),
    })?;

    let read = |path: PathBuf| {
        std::fs::read(&path).map_err(|source| TlsConfigError::Unreadable { path, source })
    };

    Ok(Some(EnvServerConfig {
        hmr_host: host.clone(),
        host,
        https: TlsIdentity {
            key: read(key_path)?,
            cert: read(cert_path)?,
        },
    }))
}

/// Host name of `APP_URL`, if it parses and has one.
///
/// Only the host name is kept: `https://app.test:8443` gives `app.test`. The
/// value ends up in `server.host` and `hmr.host`, where a port would produce
/// URLs like `https://app.test:8443:5173`.
#[must_use]
pub fn resolve_host_from_env(env: &EnvVars) -> Option<String> {
    let app_url = env.get(vars::APP_URL)?;
    let parsed = url::Url::parse(app_url).ok()?;
    parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
}
