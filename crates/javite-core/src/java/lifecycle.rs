//! Hot file and process-exit cleanup.
//!
//! The hot file's presence tells the backend to load assets from the dev
//! server instead of the build manifest. It is written once the listener is
//! bound and removed when the process exits or receives a termination signal.

use super::url::DevServerUrl;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// The marker file read by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotFile {
    path: PathBuf,
}

impl HotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File contents for `url` served under `base`: the origin followed by
    /// the base with one trailing slash removed.
    #[must_use]
    pub fn contents(url: &DevServerUrl, base: &str) -> String {
        let base = base.strip_suffix('/').unwrap_or(base);
        format!("{url}{base}")
    }

    /// Write the hot file, creating parent directories as needed.
    pub fn write(&self, url: &DevServerUrl, base: &str) -> io::Result<()> {
        javite_util::fs::atomic_write(&self.path, Self::contents(url, base).as_bytes())
    }

    /// Remove the hot file. A missing file is not an error.
    pub fn remove(&self) -> io::Result<bool> {
        javite_util::fs::remove_file_if_exists(&self.path)
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Termination signals that trigger cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSignal {
    Interrupt,
    Terminate,
    Hangup,
}

impl ExitSignal {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Hangup => "SIGHUP",
        }
    }

    /// Conventional shell exit status: 128 + signal number.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Hangup => 129,
            Self::Interrupt => 130,
            Self::Terminate => 143,
        }
    }
}

type CleanupHandler = Box<dyn FnOnce() + Send>;

/// Process-level cleanup registry.
///
/// Owned by whatever drives the server process and shared with every plugin
/// instance. Only the first registration is kept, and the handler runs at
/// most once no matter how many exit paths fire.
#[derive(Default)]
pub struct LifecycleRegistry {
    registered: AtomicBool,
    handler: Mutex<Option<CleanupHandler>>,
}

impl LifecycleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` unless one was registered before.
    ///
    /// Returns whether this call registered it.
    pub fn register_once(&self, handler: impl FnOnce() + Send + 'static) -> bool {
        if self.registered.swap(true, Ordering::SeqCst) {
            tracing::debug!("cleanup handler already registered");
            return false;
        }
        *self.handler.lock().unwrap_or_else(PoisonError::into_inner) = Some(Box::new(handler));
        true
    }

    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    /// Run the registered handler. Later calls do nothing.
    ///
    /// Returns whether the handler ran on this call.
    pub fn run_cleanup(&self) -> bool {
        let handler = self
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    /// Clean up after `signal` and return the status the process should exit with.
    pub fn handle_signal(&self, signal: ExitSignal) -> i32 {
        tracing::debug!(signal = signal.name(), "received termination signal");
        self.run_cleanup();
        signal.exit_code()
    }
}

impl std::fmt::Debug for LifecycleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleRegistry")
            .field("registered", &self.is_registered())
            .finish_non_exhaustive()
    }
}
