//! Process lifecycle handlers
//!
//! The guardian owns the exit policy of the process: panics and failures in
//! watched background tasks are fatal (exit code 1), termination signals are
//! clean shutdowns (exit code 0). Every path logs a diagnostic, runs the
//! registered shutdown hooks once, logs the final exit code, and then calls
//! the injected exit function.
//!
//! Dependencies are injected so tests can substitute a recording exit
//! function instead of terminating the test process.

use std::future::Future;
use std::panic;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::logging::Logger;

/// What caused the process to terminate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A panic reached the global hook
    Panic,
    /// A watched background task returned an error or panicked
    TaskFailure,
    /// SIGINT (Ctrl-C)
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl Trigger {
    /// Exit code policy: crashes exit 1, requested shutdown exits 0
    pub fn exit_code(self) -> i32 {
        match self {
            Trigger::Panic | Trigger::TaskFailure => 1,
            Trigger::Interrupt | Trigger::Terminate => 0,
        }
    }
}

type ExitFn = dyn Fn(i32) + Send + Sync;
type ShutdownHook = Box<dyn FnOnce() + Send>;

struct GuardianInner {
    logger: Arc<Logger>,
    exit: Box<ExitFn>,
    hooks: Mutex<Vec<ShutdownHook>>,
    installed: AtomicBool,
    terminating: AtomicBool,
}

impl GuardianInner {
    /// Run the termination sequence once; later triggers are ignored
    fn terminate(&self, trigger: Trigger, detail: &str) {
        if self.terminating.swap(true, Ordering::SeqCst) {
            return;
        }

        match trigger {
            Trigger::Panic | Trigger::TaskFailure => self.logger.error(detail),
            Trigger::Interrupt | Trigger::Terminate => self.logger.info(detail),
        }

        self.run_hooks();

        let code = trigger.exit_code();
        self.logger.info(&format!("Process exiting with code {}", code));
        (self.exit)(code);
    }

    fn run_hooks(&self) {
        let hooks: Vec<ShutdownHook> = match self.hooks.lock() {
            Ok(mut hooks) => hooks.drain(..).collect(),
            Err(_) => return,
        };
        if !hooks.is_empty() {
            self.logger
                .verbose(&format!("Running {} shutdown hooks", hooks.len()));
        }
        for hook in hooks {
            hook();
        }
    }
}

/// Process lifecycle guardian
///
/// Construct once at startup, register shutdown hooks, then [`install`]
/// (requires a running tokio runtime for the signal listeners).
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use vigil::config::LogConfig;
/// use vigil::guardian::Guardian;
/// use vigil::logging::Logger;
///
/// # #[tokio::main] async fn main() -> anyhow::Result<()> {
/// let logger = Arc::new(Logger::new(LogConfig::default())?);
/// let guardian = Guardian::new(Arc::clone(&logger));
/// guardian.on_shutdown(|| println!("closing connections"));
/// guardian.install();
/// # Ok(()) }
/// ```
///
/// [`install`]: Guardian::install
#[derive(Clone)]
pub struct Guardian {
    inner: Arc<GuardianInner>,
}

impl Guardian {
    /// Create a guardian that terminates via [`std::process::exit`]
    pub fn new(logger: Arc<Logger>) -> Self {
        Self::with_exit(logger, |code| process::exit(code))
    }

    /// Create a guardian with a custom exit function
    ///
    /// Tests substitute a recording closure here to assert on exit codes
    /// without killing the test process.
    pub fn with_exit(logger: Arc<Logger>, exit: impl Fn(i32) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(GuardianInner {
                logger,
                exit: Box::new(exit),
                hooks: Mutex::new(Vec::new()),
                installed: AtomicBool::new(false),
                terminating: AtomicBool::new(false),
            }),
        }
    }

    /// Register a hook run once on the termination path, before exit
    ///
    /// Hooks run in registration order. A hook registered after termination
    /// has begun never runs.
    pub fn on_shutdown(&self, hook: impl FnOnce() + Send + 'static) {
        if let Ok(mut hooks) = self.inner.hooks.lock() {
            hooks.push(Box::new(hook));
        }
    }

    /// Install the panic hook and signal listeners
    ///
    /// Idempotent: a second call on the same guardian is a no-op. Must be
    /// called from within a tokio runtime.
    pub fn install(&self) {
        if self.inner.installed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.install_panic_hook();
        self.spawn_signal_listener();
    }

    /// Spawn and monitor a fallible background task
    ///
    /// If the task returns an error or panics, the guardian logs the reason
    /// and terminates the process with exit code 1.
    pub fn watch<F, E>(&self, name: &str, future: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let name = name.to_string();
        tokio::spawn(async move {
            match tokio::spawn(future).await {
                Ok(Ok(())) => {
                    inner
                        .logger
                        .verbose(&format!("Watched task '{}' finished", name));
                }
                Ok(Err(e)) => inner.terminate(
                    Trigger::TaskFailure,
                    &format!("Watched task '{}' failed: {}", name, e),
                ),
                Err(e) => inner.terminate(
                    Trigger::TaskFailure,
                    &format!("Watched task '{}' panicked: {}", name, e),
                ),
            }
        });
    }

    /// Run the termination sequence for `trigger`
    ///
    /// Normally invoked by the installed handlers; exposed so applications
    /// can request the same exit path programmatically. Only the first
    /// trigger takes effect.
    pub fn terminate(&self, trigger: Trigger, detail: &str) {
        self.inner.terminate(trigger, detail);
    }

    fn install_panic_hook(&self) {
        let inner = Arc::clone(&self.inner);
        panic::set_hook(Box::new(move |info| {
            let payload = info.payload();
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            };
            let detail = match info.location() {
                Some(location) => format!(
                    "Uncaught panic at {}:{}: {}",
                    location.file(),
                    location.line(),
                    message
                ),
                None => format!("Uncaught panic: {}", message),
            };

            // Stderr directly; the logger may be unavailable mid-panic
            eprintln!("{}", detail);

            inner.terminate(Trigger::Panic, &detail);
        }));
    }

    fn spawn_signal_listener(&self) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};

                let mut sigint = match signal(SignalKind::interrupt()) {
                    Ok(stream) => stream,
                    Err(e) => {
                        inner
                            .logger
                            .error(&format!("Failed to install SIGINT handler: {}", e));
                        return;
                    }
                };
                let mut sigterm = match signal(SignalKind::terminate()) {
                    Ok(stream) => stream,
                    Err(e) => {
                        inner
                            .logger
                            .error(&format!("Failed to install SIGTERM handler: {}", e));
                        return;
                    }
                };

                tokio::select! {
                    _ = sigint.recv() => {
                        inner.terminate(Trigger::Interrupt, "Received SIGINT, exiting");
                    }
                    _ = sigterm.recv() => {
                        inner.terminate(Trigger::Terminate, "Received SIGTERM, exiting");
                    }
                }
            }

            #[cfg(not(unix))]
            {
                if tokio::signal::ctrl_c().await.is_ok() {
                    inner.terminate(Trigger::Interrupt, "Received interrupt, exiting");
                }
            }
        });
    }
}
