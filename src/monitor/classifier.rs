//! Event classification: timestamp decoding and category-scoped message rendering.

use crate::core::errors::{Result, WatchError};
use crate::hal::{ControllerSession, EventCategory, EventRecord};

use super::tables::TemplateTable;
use super::{timestamp, truncate_chars};

/// Longest rendered message text, in characters.
pub const MAX_MESSAGE_LEN: usize = 127;
/// Text for events that carry no category.
pub const NO_EVENT_TEXT: &str = "No or undefined Event";
/// Width of the owner/category column.
const LABEL_WIDTH: usize = 20;

/// A formatted event line and its timestamp. Both are single-line and
/// length-capped at construction: control characters become spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    text: String,
    timestamp: String,
}

impl RenderedMessage {
    #[must_use]
    pub fn new(text: &str, timestamp: &str) -> Self {
        Self {
            text: truncate_chars(&printable(text), MAX_MESSAGE_LEN),
            timestamp: truncate_chars(&printable(timestamp), timestamp::MAX_TIMESTAMP_LEN),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Console line used by the history report.
    #[must_use]
    pub fn console_line(&self) -> String {
        format!("{} {}", self.timestamp, self.text)
    }
}

/// Fetch event `index` from the session's current page and render it.
///
/// `Ok(None)` means the event was skipped because its packed timestamp is not
/// a calendar date.
pub fn render(session: &mut dyn ControllerSession, index: u32) -> Result<Option<RenderedMessage>> {
    let record = session.fetch_event(index)?;
    render_record(session, &record)
}

/// Render an already fetched record. Host events query the session for system
/// information to choose between the SCSI and IDE tables.
pub fn render_record(
    session: &mut dyn ControllerSession,
    record: &EventRecord,
) -> Result<Option<RenderedMessage>> {
    let Some(stamp) = timestamp::render(record.raw_timestamp) else {
        tracing::warn!(
            controller = session.name(),
            raw = %format!("{:#010x}", record.raw_timestamp),
            "skipping event with invalid packed date"
        );
        return Ok(None);
    };

    let text = match record.category {
        EventCategory::RaidSet => labeled(&record.owner_label, TemplateTable::Raid, record)?,
        EventCategory::VolumeSet => labeled(&record.owner_label, TemplateTable::Volume, record)?,
        EventCategory::Device => format!(
            "IDE Channel #{:2}     {}",
            u16::from(record.channel) + 1,
            template(TemplateTable::Device, record)?
        ),
        EventCategory::Host => {
            let table = if session.system_info()?.has_scsi_host_channels() {
                TemplateTable::ScsiHost
            } else {
                TemplateTable::IdeHost
            };
            labeled(record.category.label(), table, record)?
        }
        EventCategory::HardwareMonitor => labeled(
            record.category.label(),
            TemplateTable::HardwareMonitor,
            record,
        )?,
        EventCategory::LegacySensor => {
            labeled(&record.owner_label, TemplateTable::LegacySensor, record)?
        }
        EventCategory::None => NO_EVENT_TEXT.to_string(),
    };

    Ok(Some(RenderedMessage::new(&text, &stamp)))
}

fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn template(table: TemplateTable, record: &EventRecord) -> Result<&'static str> {
    table
        .lookup(record.event_type)
        .ok_or_else(|| WatchError::UnknownEventType {
            category: record.category.as_str(),
            event_type: record.event_type,
        })
}

fn labeled(label: &str, table: TemplateTable, record: &EventRecord) -> Result<String> {
    Ok(format!(
        "{label:<width$}{}",
        template(table, record)?,
        width = LABEL_WIDTH
    ))
}
