//! Poll engine: baseline, incremental cycles and the full history report.
//!
//! Per session:
//!
//! ```text
//! Uninitialized --set_clock + incremental read (count discarded)--> Baselined
//! Baselined     --incremental read = n--> dispatch 0..n ascending --> Baselined
//! ```
//!
//! A session whose baseline read fails stays `Uninitialized` and is baselined
//! again on the next cycle instead of being polled, so history that predates
//! the daemon is never notified.

#![allow(missing_docs)]

use std::io::{self, Write};

use chrono::NaiveDateTime;

use super::classifier::{self, RenderedMessage};
use super::registry::SessionRegistry;
use crate::hal::{ControllerSession, CountMode};
use crate::logger::dual::Dispatcher;

const REPORT_HEADER: &str = "Date-Time                Device              Event Type        ";
const REPORT_RULE: &str =
    "================================================================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Baselined,
}

/// Outcome counters for one pass over all sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Events rendered and handed to the dispatcher.
    pub dispatched: usize,
    /// Events skipped because of an invalid packed date.
    pub skipped: usize,
    /// Events whose fetch or classification failed.
    pub failed: usize,
    /// Sessions whose count query failed this pass.
    pub sessions_failed: usize,
    /// Sessions baselined during this pass.
    pub baselined: usize,
}

#[derive(Debug)]
pub struct PollEngine {
    registry: SessionRegistry,
    states: Vec<SessionState>,
    dispatcher: Dispatcher,
}

impl PollEngine {
    #[must_use]
    pub fn new(registry: SessionRegistry, dispatcher: Dispatcher) -> Self {
        let states = vec![SessionState::Uninitialized; registry.len()];
        Self {
            registry,
            states,
            dispatcher,
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn states(&self) -> &[SessionState] {
        &self.states
    }

    /// Set every session's clock and move its incremental cursor to "now",
    /// discarding the count.
    pub fn baseline(&mut self, now: NaiveDateTime) -> CycleReport {
        let mut report = CycleReport::default();
        for (session, state) in self.registry.sessions_mut().zip(self.states.iter_mut()) {
            if baseline_session(session.as_mut(), now) {
                *state = SessionState::Baselined;
                report.baselined += 1;
            } else {
                report.sessions_failed += 1;
            }
        }
        report
    }

    /// One pass: dispatch every event that arrived since the previous pass,
    /// oldest first, to both sinks.
    pub fn poll_cycle(&mut self, now: NaiveDateTime) -> CycleReport {
        let mut report = CycleReport::default();
        for (session, state) in self.registry.sessions_mut().zip(self.states.iter_mut()) {
            let session = session.as_mut();
            if *state == SessionState::Uninitialized {
                if baseline_session(session, now) {
                    *state = SessionState::Baselined;
                    report.baselined += 1;
                } else {
                    report.sessions_failed += 1;
                }
                continue;
            }

            let count = match session.event_count(CountMode::Incremental) {
                Ok(count) => count,
                Err(err) => {
                    tracing::warn!(
                        controller = session.name(),
                        error = %err,
                        "new-event count failed; treating as no new events"
                    );
                    report.sessions_failed += 1;
                    continue;
                }
            };

            for index in 0..count {
                if let Some(message) = render_logged(session, index, &mut report) {
                    self.dispatcher.notify(&message);
                    report.dispatched += 1;
                }
            }
        }
        report
    }

    /// Print each session's whole history, newest first, and mail every entry.
    /// The log sink is not used.
    pub fn dump_history(
        &mut self,
        now: NaiveDateTime,
        out: &mut dyn Write,
    ) -> io::Result<CycleReport> {
        let mut report = CycleReport::default();
        for session in self.registry.sessions_mut() {
            let session = session.as_mut();
            if let Err(err) = session.set_clock(now) {
                tracing::warn!(controller = session.name(), error = %err, "set clock failed");
            }
            let count = match session.event_count(CountMode::Full) {
                Ok(count) => count,
                Err(err) => {
                    tracing::warn!(controller = session.name(), error = %err, "event count failed");
                    report.sessions_failed += 1;
                    continue;
                }
            };
            if count == 0 {
                continue;
            }

            writeln!(out, "{REPORT_HEADER}")?;
            writeln!(out, "{REPORT_RULE}")?;
            for index in (0..count).rev() {
                if let Some(message) = render_logged(session, index, &mut report) {
                    writeln!(out, "{}", message.console_line())?;
                    self.dispatcher.mail_only(&message);
                    report.dispatched += 1;
                }
            }
            writeln!(out, "{REPORT_RULE}")?;
        }
        Ok(report)
    }
}

fn baseline_session(session: &mut dyn ControllerSession, now: NaiveDateTime) -> bool {
    if let Err(err) = session.set_clock(now) {
        tracing::warn!(controller = session.name(), error = %err, "set clock failed");
    }
    match session.event_count(CountMode::Incremental) {
        Ok(discarded) => {
            tracing::debug!(controller = session.name(), discarded, "baseline established");
            true
        }
        Err(err) => {
            tracing::warn!(
                controller = session.name(),
                error = %err,
                "baseline failed; retrying next cycle"
            );
            false
        }
    }
}

fn render_logged(
    session: &mut dyn ControllerSession,
    index: u32,
    report: &mut CycleReport,
) -> Option<RenderedMessage> {
    match classifier::render(session, index) {
        Ok(Some(message)) => Some(message),
        Ok(None) => {
            report.skipped += 1;
            None
        }
        Err(err) => {
            tracing::warn!(
                controller = session.name(),
                index,
                code = err.code(),
                error = %err,
                "event not rendered"
            );
            report.failed += 1;
            None
        }
    }
}
