//! Controller session registry: one session per discovered controller, capped.

#![allow(missing_docs)]

use std::slice::IterMut;

use crate::core::errors::{Result, WatchError};
use crate::hal::{ControllerSession, Transport};

/// Number of controllers watched unless configured otherwise.
pub const DEFAULT_CONTROLLER_CAP: usize = 4;

/// Sessions opened at startup. The set never changes afterwards; sessions are
/// closed when the registry is dropped.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Vec<Box<dyn ControllerSession>>,
}

impl SessionRegistry {
    /// Ask the transport for up to `cap` sessions. An empty result is not an
    /// error here; see [`Self::require_nonempty`].
    pub fn discover(transport: &mut dyn Transport, cap: usize) -> Self {
        let mut sessions = transport.discover(cap);
        sessions.truncate(cap);
        for session in &sessions {
            tracing::info!(controller = session.name(), "controller session opened");
        }
        Self { sessions }
    }

    #[must_use]
    pub fn from_sessions(sessions: Vec<Box<dyn ControllerSession>>) -> Self {
        Self { sessions }
    }

    /// Fail with [`WatchError::DiscoveryEmpty`] when nothing was found.
    pub fn require_nonempty(self) -> Result<Self> {
        if self.sessions.is_empty() {
            Err(WatchError::DiscoveryEmpty)
        } else {
            Ok(self)
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.sessions.iter().map(|session| session.name()).collect()
    }

    pub(crate) fn sessions_mut(&mut self) -> IterMut<'_, Box<dyn ControllerSession>> {
        self.sessions.iter_mut()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.names())
            .finish()
    }
}
