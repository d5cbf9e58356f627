//! File-backed controllers.
//!
//! Each `*.toml` file in the journal directory stands for one controller. The
//! file is re-read on every count query, so events appended by an external
//! collector show up as new events on the next poll:
//!
//! ```toml
//! [system]
//! model = "ARC-1220"
//! scsi_host_channels = 0
//!
//! [[events]]
//! category = "raid_set"
//! type = 4
//! owner = "Raid Set # 00"
//! at = "2006-03-15T09:30:00"
//!
//! [[events]]
//! category = "device"
//! type = 1
//! channel = 2
//! ticks = 91234
//!
//! [[events]]
//! category_code = 5
//! type = 0
//! raw_time = 2564724608
//! ```
//!
//! `category_code` (the controller's numeric category) overrides `category`.
//! `raw_time` (the packed 32-bit value) takes precedence over `at`, which takes
//! precedence over `ticks`.
//!
//! The cursor lives in memory only. A journal that shrinks has been rotated or
//! rewritten, so the cursor starts over at its first entry.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::{ControllerSession, CountMode, EventCategory, EventRecord, SystemInfo, Transport};
use crate::core::errors::{Result, WatchError};
use crate::monitor::timestamp::{pack_datetime, pack_ticks};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JournalFile {
    system: SystemInfo,
    events: Vec<JournalEvent>,
}

#[derive(Debug, Deserialize)]
struct JournalEvent {
    #[serde(default)]
    category: EventCategory,
    category_code: Option<u8>,
    #[serde(rename = "type", default)]
    event_type: u16,
    #[serde(default)]
    channel: u8,
    #[serde(default)]
    owner: String,
    raw_time: Option<u32>,
    at: Option<NaiveDateTime>,
    ticks: Option<u32>,
}

impl JournalEvent {
    fn into_record(self, controller: &str) -> EventRecord {
        let packed_at = self.at.and_then(|at| {
            let packed = pack_datetime(at);
            if packed.is_none() {
                tracing::warn!(
                    controller,
                    %at,
                    "journal date outside 2000-2031; falling back to ticks"
                );
            }
            packed
        });
        let raw_timestamp = self
            .raw_time
            .or(packed_at)
            .unwrap_or_else(|| pack_ticks(self.ticks.unwrap_or(0)));
        EventRecord {
            category: self
                .category_code
                .map_or(self.category, EventCategory::from_code),
            event_type: self.event_type,
            channel: self.channel,
            owner_label: self.owner,
            raw_timestamp,
        }
    }
}

#[derive(Debug)]
pub struct JournalController {
    name: String,
    path: PathBuf,
    cursor: usize,
    page: Vec<EventRecord>,
}

impl JournalController {
    /// Open a journal, checking that it parses.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
        let controller = Self {
            name,
            path,
            cursor: 0,
            page: Vec::new(),
        };
        let journal = controller.load()?;
        tracing::debug!(
            controller = %controller.name,
            model = %journal.system.model,
            firmware = %journal.system.firmware,
            events = journal.events.len(),
            "journal opened"
        );
        Ok(controller)
    }

    fn load(&self) -> Result<JournalFile> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| WatchError::retrieval(self.name.clone(), "read journal", e.to_string()))?;
        toml::from_str(&raw)
            .map_err(|e| WatchError::retrieval(self.name.clone(), "parse journal", e.to_string()))
    }
}

impl ControllerSession for JournalController {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_clock(&mut self, now: NaiveDateTime) -> Result<()> {
        // Journals have no real-time clock to program.
        tracing::debug!(controller = %self.name, %now, "controller clock set");
        Ok(())
    }

    fn event_count(&mut self, mode: CountMode) -> Result<u32> {
        let events: Vec<EventRecord> = self
            .load()?
            .events
            .into_iter()
            .map(|event| event.into_record(&self.name))
            .collect();
        if events.len() < self.cursor {
            tracing::warn!(
                controller = %self.name,
                cursor = self.cursor,
                len = events.len(),
                "journal shrank; reading it from the start"
            );
            self.cursor = 0;
        }
        self.page = match mode {
            CountMode::Full => events,
            CountMode::Incremental => {
                let end = events.len();
                let fresh = events.into_iter().skip(self.cursor).collect();
                self.cursor = end;
                fresh
            }
        };
        u32::try_from(self.page.len()).map_err(|_| {
            WatchError::retrieval(self.name.clone(), "event count", "page larger than u32::MAX")
        })
    }

    fn fetch_event(&mut self, index: u32) -> Result<EventRecord> {
        self.page.get(index as usize).cloned().ok_or_else(|| {
            WatchError::retrieval(
                self.name.clone(),
                "fetch event",
                format!("index {index} outside page of {}", self.page.len()),
            )
        })
    }

    fn system_info(&mut self) -> Result<SystemInfo> {
        Ok(self.load()?.system)
    }
}

/// Discovers one [`JournalController`] per `*.toml` file, in file-name order.
#[derive(Debug, Clone)]
pub struct JournalTransport {
    dir: PathBuf,
}

impl JournalTransport {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Transport for JournalTransport {
    fn discover(&mut self, limit: usize) -> Vec<Box<dyn ControllerSession>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(dir = %self.dir.display(), error = %err, "journal directory unreadable");
                return Vec::new();
            }
        };
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();

        let mut sessions: Vec<Box<dyn ControllerSession>> = Vec::new();
        for path in paths {
            if sessions.len() >= limit {
                break;
            }
            match JournalController::open(&path) {
                Ok(controller) => sessions.push(Box::new(controller)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping journal");
                }
            }
        }
        sessions
    }
}
