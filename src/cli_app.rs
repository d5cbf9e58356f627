//! Top-level CLI definition and dispatch.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::core::config::Config;
use crate::core::errors::{Result, WatchError};
use crate::daemon::loop_main::{self, LoopOptions, local_now};
use crate::daemon::{detach, signals::ShutdownFlag};
use crate::hal::journal::JournalTransport;
use crate::logger::dual::Dispatcher;
use crate::monitor::poll::PollEngine;
use crate::monitor::registry::SessionRegistry;

/// Relays RAID controller events to syslog and mail.
#[derive(Parser, Debug)]
#[command(name = "rwatch", version, about)]
pub struct Cli {
    /// Print every stored event (newest first), mail each one, and exit.
    #[arg(short = 'p', long = "printall", conflicts_with = "daemonize")]
    pub printall: bool,

    /// Detach and keep watching in the background.
    #[arg(short = 'd', long = "daemonize")]
    pub daemonize: bool,

    /// Configuration file (default: /etc/rwatch/config.toml when present).
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Stop after this many poll cycles. Lets the integration tests drive a
    /// bounded watch run; unset in normal operation.
    #[arg(long, value_name = "N", hide = true)]
    pub cycles: Option<u64>,
}

/// Run the selected mode.
///
/// # Errors
/// Returns startup failures: configuration errors, no controller found, or a
/// failed background detach. Nothing after the poll loop starts is an error.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    crate::logger::init_tracing();
    let config = Config::load(cli.config.as_deref())?;

    if cli.daemonize && !detach::is_detached_child() {
        // Fail in the foreground when there is nothing to watch.
        drop(discover(&config)?);
        let pid = detach::spawn_self_detached()?;
        println!("forking into background ({pid}).");
        return Ok(ExitCode::SUCCESS);
    }
    if cli.daemonize {
        detach::enter_new_session()?;
    }

    let registry = discover(&config)?;
    let mut engine = PollEngine::new(registry, Dispatcher::from_config(&config));

    if cli.printall {
        let stdout = std::io::stdout();
        let report = engine
            .dump_history(local_now(), &mut stdout.lock())
            .map_err(|e| WatchError::io("<stdout>", e))?;
        tracing::debug!(?report, "history report finished");
        return Ok(ExitCode::SUCCESS);
    }

    engine.baseline(local_now());
    let shutdown = ShutdownFlag::install().map_err(|e| WatchError::Runtime {
        details: format!("cannot install signal handlers: {e}"),
    })?;
    let options = LoopOptions {
        poll_interval: config.daemon.poll_interval(),
        background: cli.daemonize,
        max_cycles: cli.cycles,
    };
    loop_main::run(&mut engine, &options, &shutdown, local_now);
    Ok(ExitCode::SUCCESS)
}

/// Open controller sessions from the configured journal directory.
///
/// # Errors
/// [`WatchError::DiscoveryEmpty`] when no controller is found.
pub fn discover(config: &Config) -> Result<SessionRegistry> {
    let mut transport = JournalTransport::new(&config.hal.journal_dir);
    SessionRegistry::discover(&mut transport, config.daemon.max_controllers).require_nonempty()
}
