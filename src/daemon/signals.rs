//! Shutdown requests from SIGINT/SIGTERM.
//!
//! The handler only flips an atomic flag; the poll loop checks it between
//! cycles so an in-flight cycle always completes. A second signal while the
//! flag is already set terminates the process immediately.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

/// Granularity of [`ShutdownFlag::sleep`].
const SLEEP_SLICE: Duration = Duration::from_millis(200);

/// Cloneable, lock-free shutdown request flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    requested: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// A flag not connected to any signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag set by SIGINT and SIGTERM.
    pub fn install() -> io::Result<Self> {
        let shutdown = Self::new();
        for signal in [SIGINT, SIGTERM] {
            // Registered first so it sees the flag before the second handler sets it.
            flag::register_conditional_shutdown(signal, 1, Arc::clone(&shutdown.requested))?;
            flag::register(signal, Arc::clone(&shutdown.requested))?;
        }
        Ok(shutdown)
    }

    #[must_use]
    pub fn requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Sleep for `duration`, returning early once shutdown is requested.
    /// Returns `true` if the full duration elapsed.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.requested() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}
