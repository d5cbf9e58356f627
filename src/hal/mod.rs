//! Hardware abstraction seam: controller sessions, event records and discovery.
//!
//! Everything behind these traits (serial links, driver ioctls, SCSI
//! passthrough, or the bundled journal files) is opaque to the monitor. The
//! monitor only needs to open sessions, read event counts, fetch records, query
//! static system information and set the controller clock.

#![allow(missing_docs)]

pub mod journal;
pub mod memory;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::errors::Result;

/// Broad class of a controller event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    #[default]
    None,
    RaidSet,
    VolumeSet,
    Device,
    Host,
    HardwareMonitor,
    LegacySensor,
}

impl EventCategory {
    /// Map a raw controller category code. Unrecognized codes become `None`.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::RaidSet,
            2 => Self::VolumeSet,
            3 => Self::Device,
            4 => Self::Host,
            5 => Self::HardwareMonitor,
            6 => Self::LegacySensor,
            _ => Self::None,
        }
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::RaidSet => 1,
            Self::VolumeSet => 2,
            Self::Device => 3,
            Self::Host => 4,
            Self::HardwareMonitor => 5,
            Self::LegacySensor => 6,
        }
    }

    /// Stable identifier, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RaidSet => "raid_set",
            Self::VolumeSet => "volume_set",
            Self::Device => "device",
            Self::Host => "host",
            Self::HardwareMonitor => "hardware_monitor",
            Self::LegacySensor => "legacy_sensor",
        }
    }

    /// Column label used when the event has no owner name of its own.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "No Event",
            Self::RaidSet => "RaidSet",
            Self::VolumeSet => "VolumeSet",
            Self::Device => "Device",
            Self::Host => "Host",
            Self::HardwareMonitor | Self::LegacySensor => "Hw Monitor",
        }
    }
}

/// One entry of a controller's event history. Never mutated after retrieval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventRecord {
    pub category: EventCategory,
    /// Category-scoped template index.
    pub event_type: u16,
    /// Zero-based channel; only meaningful for [`EventCategory::Device`].
    pub channel: u8,
    /// Owning raid-set / volume-set / sensor name.
    pub owner_label: String,
    /// Packed timestamp; see [`crate::monitor::timestamp`].
    pub raw_timestamp: u32,
}

/// Static controller information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    pub model: String,
    pub firmware: String,
    pub scsi_host_channels: u8,
}

impl SystemInfo {
    #[must_use]
    pub const fn has_scsi_host_channels(&self) -> bool {
        self.scsi_host_channels > 0
    }
}

/// Which event page an [`ControllerSession::event_count`] call selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMode {
    /// Whole history. Leaves the incremental cursor where it is.
    Full,
    /// Events since the previous incremental read. Advances the cursor.
    Incremental,
}

/// A live handle to one controller.
///
/// Event access is page based: [`event_count`](Self::event_count) selects a
/// page and returns its length, and [`fetch_event`](Self::fetch_event) indexes
/// into the most recently selected page. Pages are ordered oldest first, so
/// index `count - 1` is the most recent event of the page.
///
/// # Cursor contract
///
/// `event_count(CountMode::Incremental)` moves the cursor past every event it
/// reports *as a side effect of the call itself*. Two incremental reads with
/// no hardware activity in between must return `n` and then `0`.
pub trait ControllerSession {
    /// Human-readable identity used in diagnostics.
    fn name(&self) -> &str;

    /// Set the controller's real-time clock.
    fn set_clock(&mut self, now: NaiveDateTime) -> Result<()>;

    /// Select a page and return its length.
    fn event_count(&mut self, mode: CountMode) -> Result<u32>;

    /// Fetch record `index` of the current page.
    fn fetch_event(&mut self, index: u32) -> Result<EventRecord>;

    fn system_info(&mut self) -> Result<SystemInfo>;
}

/// Enumerates reachable controllers.
pub trait Transport {
    /// Open up to `limit` sessions. Failures surface as a shorter (possibly
    /// empty) list, never as an error.
    fn discover(&mut self, limit: usize) -> Vec<Box<dyn ControllerSession>>;
}
