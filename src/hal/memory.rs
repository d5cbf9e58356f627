//! In-memory controllers for tests and dry runs.
//!
//! A [`MemoryController`] and its [`MemoryHandle`] share state, so a test can
//! keep the handle, hand the controller to the registry, and keep injecting
//! events or failures while the poll engine owns the session.

#![allow(missing_docs)]

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use chrono::NaiveDateTime;

use super::{ControllerSession, CountMode, EventRecord, SystemInfo, Transport};
use crate::core::errors::{Result, WatchError};

#[derive(Debug, Default)]
struct State {
    history: Vec<EventRecord>,
    cursor: usize,
    page: Vec<EventRecord>,
    system_info: SystemInfo,
    clock: Option<NaiveDateTime>,
    fail_count: bool,
    fail_system_info: bool,
    fail_fetch: HashSet<u32>,
    calls: Vec<String>,
}

/// Test-side view of a [`MemoryController`].
#[derive(Debug, Clone, Default)]
pub struct MemoryHandle {
    state: Rc<RefCell<State>>,
}

impl MemoryHandle {
    /// Append events as if the hardware had just logged them.
    pub fn push_events(&self, events: impl IntoIterator<Item = EventRecord>) {
        self.state.borrow_mut().history.extend(events);
    }

    pub fn set_system_info(&self, info: SystemInfo) {
        self.state.borrow_mut().system_info = info;
    }

    pub fn fail_event_count(&self, fail: bool) {
        self.state.borrow_mut().fail_count = fail;
    }

    pub fn fail_system_info(&self, fail: bool) {
        self.state.borrow_mut().fail_system_info = fail;
    }

    /// Make `fetch_event(index)` fail for the current and later pages.
    pub fn fail_fetch_at(&self, index: u32) {
        self.state.borrow_mut().fail_fetch.insert(index);
    }

    pub fn clear_fetch_failures(&self) {
        self.state.borrow_mut().fail_fetch.clear();
    }

    #[must_use]
    pub fn clock(&self) -> Option<NaiveDateTime> {
        self.state.borrow().clock
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.state.borrow().cursor
    }

    /// Every session call so far, e.g. `"count:incremental"` or `"fetch:3"`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }
}

#[derive(Debug)]
pub struct MemoryController {
    name: String,
    state: Rc<RefCell<State>>,
}

impl MemoryController {
    #[must_use]
    pub fn new(name: impl Into<String>) -> (Self, MemoryHandle) {
        let handle = MemoryHandle::default();
        let controller = Self {
            name: name.into(),
            state: Rc::clone(&handle.state),
        };
        (controller, handle)
    }

    fn fail(&self, operation: &'static str) -> WatchError {
        WatchError::retrieval(self.name.clone(), operation, "injected failure")
    }
}

impl ControllerSession for MemoryController {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_clock(&mut self, now: NaiveDateTime) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push("set_clock".to_string());
        state.clock = Some(now);
        Ok(())
    }

    fn event_count(&mut self, mode: CountMode) -> Result<u32> {
        let mut state = self.state.borrow_mut();
        state.calls.push(match mode {
            CountMode::Full => "count:full".to_string(),
            CountMode::Incremental => "count:incremental".to_string(),
        });
        if state.fail_count {
            drop(state);
            return Err(self.fail("event count"));
        }
        let page = match mode {
            CountMode::Full => state.history.clone(),
            CountMode::Incremental => {
                let fresh = state.history[state.cursor..].to_vec();
                let end = state.history.len();
                state.cursor = end;
                fresh
            }
        };
        state.page = page;
        u32::try_from(state.page.len()).map_err(|_| WatchError::Runtime {
            details: format!("{}: page larger than u32::MAX", self.name),
        })
    }

    fn fetch_event(&mut self, index: u32) -> Result<EventRecord> {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("fetch:{index}"));
        let record = if state.fail_fetch.contains(&index) {
            None
        } else {
            state.page.get(index as usize).cloned()
        };
        drop(state);
        record.ok_or_else(|| self.fail("fetch event"))
    }

    fn system_info(&mut self) -> Result<SystemInfo> {
        let mut state = self.state.borrow_mut();
        state.calls.push("system_info".to_string());
        if state.fail_system_info {
            drop(state);
            return Err(self.fail("system info"));
        }
        Ok(state.system_info.clone())
    }
}

/// Hands out a fixed set of controllers on the first discovery.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    controllers: VecDeque<MemoryController>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new(controllers: impl IntoIterator<Item = MemoryController>) -> Self {
        Self {
            controllers: controllers.into_iter().collect(),
        }
    }
}

impl Transport for MemoryTransport {
    fn discover(&mut self, limit: usize) -> Vec<Box<dyn ControllerSession>> {
        let take = limit.min(self.controllers.len());
        self.controllers
            .drain(..take)
            .map(|controller| Box::new(controller) as Box<dyn ControllerSession>)
            .collect()
    }
}
