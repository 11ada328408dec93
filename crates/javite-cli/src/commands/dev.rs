//! `javite dev`: a minimal dev host for the Java plugins.
//!
//! Resolves the project, binds the listener, fires the plugins' listening
//! hooks (which publish the hot file) and serves the project root. Plugin
//! middlewares see every request first. Signals run the registered cleanup
//! before the process exits.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use javite_core::host::{
    Command, HostSetting, MiddlewareResponse, PluginContainer, ServerContext, ServerSettings,
};
use javite_core::java::ExitSignal;
use javite_core::{start_session, Config, LifecycleRegistry};
use miette::{IntoDiagnostic, Result};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// How many ports above the configured one to try when `strictPort` is off.
const PORT_ATTEMPTS: u16 = 10;

/// Options for `javite dev`.
#[derive(Debug)]
pub struct DevAction {
    /// Runtime configuration.
    pub config: Config,
    /// Mode (e.g. "development").
    pub mode: String,
}

struct DevState {
    root: PathBuf,
    plugins: PluginContainer,
    server: ServerContext,
}

pub async fn run(action: DevAction) -> Result<()> {
    let lifecycle = Arc::new(LifecycleRegistry::new());
    let session = start_session(
        &action.config,
        Command::Serve,
        &action.mode,
        Arc::clone(&lifecycle),
    )
    .into_diagnostic()?;

    if let Some(path) = &session.config_path {
        let rel_path = path.strip_prefix(&action.config.cwd).unwrap_or(path);
        println!("  Loaded config from {}", rel_path.display());
    }

    let settings = session.config.server.clone();
    if settings.https_enabled() {
        tracing::warn!("TLS identity resolved but the built-in host serves plain HTTP");
    }

    let mut server = ServerContext::new(session.config.clone());
    session
        .plugins
        .call_configure_server(&mut server)
        .into_diagnostic()?;

    let listener = bind(&settings).await.into_diagnostic()?;
    let addr = listener.local_addr().into_diagnostic()?;

    // Handlers go in before the hot file exists.
    let mut signals = ShutdownSignals::register().into_diagnostic()?;

    if let Err(err) = server.notify_listening(addr) {
        lifecycle.run_cleanup();
        return Err(err).into_diagnostic();
    }

    let url = server
        .resolved_url()
        .map_or_else(|| format!("http://{addr}"), str::to_string);
    println!();
    println!("  Dev server running at {url}");
    println!("  Press Ctrl+C to stop");
    println!();

    let state = Arc::new(DevState {
        root: session.config.root.clone(),
        plugins: session.plugins,
        server,
    });

    let app = Router::new()
        .fallback(serve_file)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            plugin_middlewares,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state);

    tokio::select! {
        result = axum::serve(listener, app) => {
            lifecycle.run_cleanup();
            result.into_diagnostic()?;
            Ok(())
        }
        signal = signals.recv() => {
            tracing::debug!(signal = signal.name(), "shutting down");
            let code = lifecycle.handle_signal(signal);
            std::process::exit(code);
        }
    }
}

/// Bind the configured address. Without `strictPort`, busy ports are skipped.
async fn bind(settings: &ServerSettings) -> io::Result<TcpListener> {
    let host = match &settings.host {
        HostSetting::Name(name) => name.clone(),
        HostSetting::Flag(true) => "0.0.0.0".to_string(),
        HostSetting::Flag(false) => "127.0.0.1".to_string(),
    };

    let mut port = settings.port;
    let mut attempts = 0;
    loop {
        match TcpListener::bind((host.as_str(), port)).await {
            Ok(listener) => return Ok(listener),
            Err(err) if err.kind() == io::ErrorKind::AddrInUse && !settings.strict_port => {
                attempts += 1;
                if attempts > PORT_ATTEMPTS || port == u16::MAX {
                    return Err(err);
                }
                tracing::info!(port, "port in use, trying another one");
                port += 1;
            }
            Err(err) if err.kind() == io::ErrorKind::AddrInUse => {
                return Err(io::Error::new(
                    err.kind(),
                    format!("port {port} is already in use"),
                ));
            }
            Err(err) => return Err(err),
        }
    }
}

/// SIGINT, SIGTERM and SIGHUP listeners.
#[cfg(unix)]
struct ShutdownSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn register() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    async fn recv(&mut self) -> ExitSignal {
        tokio::select! {
            _ = self.interrupt.recv() => ExitSignal::Interrupt,
            _ = self.terminate.recv() => ExitSignal::Terminate,
            _ = self.hangup.recv() => ExitSignal::Hangup,
        }
    }
}

#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    #[allow(clippy::unnecessary_wraps)]
    fn register() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> ExitSignal {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        ExitSignal::Interrupt
    }
}

type AppState = Arc<DevState>;

/// Offer the request to the plugin middlewares before the file handler.
///
/// `/` is offered as `/index.html`, the way an html-serving host resolves it.
async fn plugin_middlewares(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = match req.uri().path() {
        "/" => "/index.html",
        path => path,
    };
    match state.server.handle_request(req.method().as_str(), path) {
        Some(response) => middleware_response(response),
        None => next.run(req).await,
    }
}

fn middleware_response(response: MiddlewareResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    (
        status,
        [(header::CONTENT_TYPE, response.content_type)],
        response.body,
    )
        .into_response()
}

/// Serve a file from the project root, running script modules through the
/// plugin transforms.
async fn serve_file(State(state): State<AppState>, req: Request) -> Response {
    let url_path = match req.uri().path() {
        "/" => "/index.html",
        path => path,
    };
    let Some(file) = resolve_path(&state.root, url_path) else {
        return StatusCode::FORBIDDEN.into_response();
    };

    let bytes = match tokio::fs::read(&file).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return (StatusCode::NOT_FOUND, format!("Not found: {url_path}")).into_response();
        }
        Err(err) => {
            tracing::warn!(path = %file.display(), error = %err, "failed to read file");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let content_type = content_type(&file);
    if !is_script(&file) {
        return ([(header::CONTENT_TYPE, content_type)], bytes).into_response();
    }

    let code = String::from_utf8_lossy(&bytes);
    let id = file.to_string_lossy();
    match state.plugins.transform(&code, &id) {
        Ok(code) => (
            [
                (header::CONTENT_TYPE, content_type),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            code,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(path = %file.display(), error = %err, "transform failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Map a URL path onto `root`, refusing anything that climbs out of it.
fn resolve_path(root: &Path, url_path: &str) -> Option<PathBuf> {
    let relative = Path::new(url_path.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }
    Some(root.join(relative))
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

fn is_script(path: &Path) -> bool {
    matches!(
        extension(path),
        "js" | "mjs" | "cjs" | "jsx" | "ts" | "mts" | "tsx" | "vue" | "svelte"
    )
}

fn content_type(path: &Path) -> &'static str {
    match extension(path) {
        "html" => "text/html; charset=utf-8",
        "js" | "mjs" | "cjs" | "jsx" | "ts" | "mts" | "tsx" | "vue" | "svelte" => {
            "application/javascript"
        }
        "css" => "text/css",
        "json" | "map" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
