//! Daemon lifecycle: startup notice, fixed-interval poll loop, shutdown notice.

#![allow(missing_docs)]

use std::time::Duration;

use chrono::{Local, NaiveDateTime};

use super::signals::ShutdownFlag;
use crate::monitor::poll::{CycleReport, PollEngine};

pub const STARTUP_NOTICE: &str = "Startup successful! Waiting for new events now...";
pub const SHUTDOWN_NOTICE: &str = "Shutdown requested!";

#[derive(Debug, Clone)]
pub struct LoopOptions {
    pub poll_interval: Duration,
    /// Running detached; shutdown is announced on the log sink.
    pub background: bool,
    /// Stop after this many cycles. `None` runs until shutdown.
    pub max_cycles: Option<u64>,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            background: false,
            max_cycles: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub cycles: u64,
    pub totals: CycleReport,
}

/// Poll every session, sleep, repeat, until `shutdown` is requested.
///
/// The flag is checked before each cycle and during the sleep, never in the
/// middle of a cycle. The engine must already be baselined.
pub fn run(
    engine: &mut PollEngine,
    options: &LoopOptions,
    shutdown: &ShutdownFlag,
    clock: impl Fn() -> NaiveDateTime,
) -> LoopSummary {
    engine.dispatcher().lifecycle(STARTUP_NOTICE);
    tracing::info!(
        interval_secs = options.poll_interval.as_secs(),
        background = options.background,
        "poll loop started"
    );

    let mut summary = LoopSummary::default();
    while !shutdown.requested() {
        let report = engine.poll_cycle(clock());
        summary.cycles += 1;
        accumulate(&mut summary.totals, report);
        if report != CycleReport::default() {
            tracing::debug!(cycle = summary.cycles, ?report, "cycle finished");
        }

        if options.max_cycles.is_some_and(|max| summary.cycles >= max) {
            break;
        }
        shutdown.sleep(options.poll_interval);
    }

    if options.background {
        engine.dispatcher().lifecycle(SHUTDOWN_NOTICE);
    }
    tracing::info!(cycles = summary.cycles, "poll loop stopped");
    summary
}

/// Wall-clock source for [`run`].
#[must_use]
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn accumulate(total: &mut CycleReport, cycle: CycleReport) {
    total.dispatched += cycle.dispatched;
    total.skipped += cycle.skipped;
    total.failed += cycle.failed;
    total.sessions_failed += cycle.sessions_failed;
    total.baselined += cycle.baselined;
}
