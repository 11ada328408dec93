//! Dev server URL resolution.
//!
//! The listener's bind address is frequently not what a browser can reach
//! (containers, reverse proxies), so explicit HMR settings take priority over
//! the server settings, which take priority over the bound socket.

use crate::host::ServerSettings;
use serde::Serialize;
use std::fmt;
use std::net::SocketAddr;

/// The externally reachable origin of the dev server, e.g. `http://localhost:5173`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DevServerUrl(String);

impl DevServerUrl {
    /// Wrap an origin verbatim, e.g. a user-pinned `server.origin`.
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    #[must_use]
    pub fn from_parts(scheme: &str, host: &str, port: u16) -> Self {
        Self(format!("{scheme}://{host}:{port}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DevServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the dev server URL from the bound address and server settings.
///
/// - protocol: HMR `protocol` (`wss` → `https`, anything else → `http`), else
///   `https` when the server terminates TLS, else `http`;
/// - host: HMR `host`, else the string form of `server.host`, else the bound
///   IP (IPv6 wrapped in brackets);
/// - port: HMR `clientPort`, else the bound port.
#[must_use]
pub fn resolve_dev_server_url(address: SocketAddr, server: &ServerSettings) -> DevServerUrl {
    let hmr = server.hmr.as_ref().and_then(|hmr| hmr.options());

    let protocol = match hmr.and_then(|h| h.protocol.as_deref()) {
        Some("wss") => "https",
        Some(_) => "http",
        None if server.https_enabled() => "https",
        None => "http",
    };

    let host = hmr
        .and_then(|h| h.host.clone())
        .or_else(|| server.host.name().map(str::to_string))
        .unwrap_or_else(|| match address {
            SocketAddr::V4(v4) => v4.ip().to_string(),
            SocketAddr::V6(v6) => format!("[{}]", v6.ip()),
        });

    let port = hmr.and_then(|h| h.client_port).unwrap_or(address.port());

    DevServerUrl::from_parts(protocol, &host, port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HmrOptions, HmrSetting, HostSetting, HttpsConfig};

    fn server() -> ServerSettings {
        ServerSettings {
            origin: None,
            host: HostSetting::Flag(true),
            port: 5173,
            strict_port: true,
            hmr: None,
            https: None,
        }
    }

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_falls_back_to_bound_ipv4() {
        let url = resolve_dev_server_url(addr("1.2.3.4:5173"), &server());
        assert_eq!(url.as_str(), "http://1.2.3.4:5173");
    }

    #[test]
    fn test_ipv6_is_bracketed() {
        let url = resolve_dev_server_url(addr("[::1]:5174"), &server());
        assert_eq!(url.as_str(), "http://[::1]:5174");
    }

    #[test]
    fn test_hmr_host_beats_bound_address() {
        let mut settings = server();
        settings.hmr = Some(HmrSetting::Options(HmrOptions {
            host: Some("h".to_string()),
            ..Default::default()
        }));
        let url = resolve_dev_server_url(addr("1.2.3.4:5173"), &settings);
        assert_eq!(url.as_str(), "http://h:5173");
    }

    #[test]
    fn test_hmr_host_beats_server_host() {
        let mut settings = server();
        settings.host = HostSetting::Name("localhost".to_string());
        settings.hmr = Some(HmrSetting::Options(HmrOptions {
            host: Some("vite.app.test".to_string()),
            ..Default::default()
        }));
        let url = resolve_dev_server_url(addr("127.0.0.1:5173"), &settings);
        assert_eq!(url.as_str(), "http://vite.app.test:5173");
    }

    #[test]
    fn test_server_host_string_beats_bound_address() {
        let mut settings = server();
        settings.host = HostSetting::Name("localhost".to_string());
        let url = resolve_dev_server_url(addr("127.0.0.1:5173"), &settings);
        assert_eq!(url.as_str(), "http://localhost:5173");
    }

    #[test]
    fn test_https_server_option() {
        let mut settings = server();
        settings.https = Some(HttpsConfig::Flag(true));
        let url = resolve_dev_server_url(addr("127.0.0.1:5173"), &settings);
        assert_eq!(url.as_str(), "https://127.0.0.1:5173");

        settings.https = Some(HttpsConfig::Flag(false));
        let url = resolve_dev_server_url(addr("127.0.0.1:5173"), &settings);
        assert_eq!(url.as_str(), "http://127.0.0.1:5173");
    }

    #[test]
    fn test_hmr_protocol_beats_https_option() {
        let mut settings = server();
        settings.https = Some(HttpsConfig::Flag(true));
        settings.hmr = Some(HmrSetting::Options(HmrOptions {
            protocol: Some("ws".to_string()),
            ..Default::default()
        }));
        let url = resolve_dev_server_url(addr("127.0.0.1:5173"), &settings);
        assert_eq!(url.as_str(), "http://127.0.0.1:5173");

        settings.https = None;
        settings.hmr = Some(HmrSetting::Options(HmrOptions {
            protocol: Some("wss".to_string()),
            client_port: Some(443),
            ..Default::default()
        }));
        let url = resolve_dev_server_url(addr("127.0.0.1:5173"), &settings);
        assert_eq!(url.as_str(), "https://127.0.0.1:443");
    }

    #[test]
    fn test_hmr_flag_is_ignored() {
        let mut settings = server();
        settings.hmr = Some(HmrSetting::Flag(false));
        let url = resolve_dev_server_url(addr("10.0.0.2:3000"), &settings);
        assert_eq!(url.as_str(), "http://10.0.0.2:3000");
    }
}
