//! Notification sinks: system log and mail, fanned out by the dual dispatcher.

pub mod dual;
pub mod mail;
pub mod syslog;

/// Install the stderr diagnostics subscriber.
///
/// Filter comes from `RWATCH_LOG` (e.g. `debug`, `raid_event_watch=trace`),
/// defaulting to `info`. Calling it twice is harmless.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("RWATCH_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
