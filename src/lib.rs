//! RAID controller event watcher.
//!
//! Discovers controller sessions, remembers where each controller's event
//! history stood at startup, and relays every event that arrives afterwards to
//! the system log and to mail, exactly once and oldest first.

pub mod core;
#[cfg(feature = "daemon")]
pub mod daemon;
pub mod hal;
pub mod logger;
pub mod monitor;

#[cfg(feature = "cli")]
pub mod cli_app;
