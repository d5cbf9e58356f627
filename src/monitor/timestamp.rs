//! Packed controller timestamps.
//!
//! Bit 31 selects the encoding. When set, the low bits hold a calendar date:
//!
//! | bits  | field                 |
//! |-------|-----------------------|
//! | 0-5   | second                |
//! | 6-11  | minute                |
//! | 12-16 | hour                  |
//! | 17-21 | day of month          |
//! | 22-25 | month                 |
//! | 26-30 | year offset from 2000 |
//!
//! When clear, bits 0-30 are a relative tick counter with no calendar meaning.

#![allow(missing_docs)]

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use super::truncate_chars;

/// Encoding selector.
pub const ABSOLUTE_FLAG: u32 = 0x8000_0000;
const TICK_MASK: u32 = !ABSOLUTE_FLAG;
/// Longest rendered timestamp, in characters.
pub const MAX_TIMESTAMP_LEN: usize = 63;
/// Output layout for absolute timestamps.
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";
const BASE_YEAR: i32 = 2000;

/// Raw fields of an absolute timestamp, before calendar validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedFields {
    pub year_offset: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl PackedFields {
    #[must_use]
    pub const fn unpack(raw: u32) -> Self {
        Self {
            second: (raw & 0x3f) as u8,
            minute: ((raw >> 6) & 0x3f) as u8,
            hour: ((raw >> 12) & 0x1f) as u8,
            day: ((raw >> 17) & 0x1f) as u8,
            month: ((raw >> 22) & 0x0f) as u8,
            year_offset: ((raw >> 26) & 0x1f) as u8,
        }
    }

    /// Pack into a raw value with the absolute flag set. Out-of-width fields
    /// are masked.
    #[must_use]
    pub const fn pack(self) -> u32 {
        ABSOLUTE_FLAG
            | ((self.year_offset as u32 & 0x1f) << 26)
            | ((self.month as u32 & 0x0f) << 22)
            | ((self.day as u32 & 0x1f) << 17)
            | ((self.hour as u32 & 0x1f) << 12)
            | ((self.minute as u32 & 0x3f) << 6)
            | (self.second as u32 & 0x3f)
    }

    /// The calendar date-time, or `None` when the fields do not form one.
    #[must_use]
    pub fn to_datetime(self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            BASE_YEAR + i32::from(self.year_offset),
            u32::from(self.month),
            u32::from(self.day),
        )?
        .and_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )
    }
}

/// Pack a calendar date-time. `None` outside the representable years
/// (2000-2031).
#[must_use]
pub fn pack_datetime(at: NaiveDateTime) -> Option<u32> {
    let year_offset = u8::try_from(at.year() - BASE_YEAR).ok().filter(|y| *y < 32)?;
    Some(
        PackedFields {
            year_offset,
            month: at.month() as u8,
            day: at.day() as u8,
            hour: at.hour() as u8,
            minute: at.minute() as u8,
            second: at.second() as u8,
        }
        .pack(),
    )
}

/// Pack a relative tick value. Bit 31 is dropped.
#[must_use]
pub const fn pack_ticks(ticks: u32) -> u32 {
    ticks & TICK_MASK
}

/// Render a raw timestamp.
///
/// Returns `None` when the absolute flag is set but the fields are not a valid
/// calendar date; callers skip such events.
#[must_use]
pub fn render(raw: u32) -> Option<String> {
    let text = if raw & ABSOLUTE_FLAG == 0 {
        (raw & TICK_MASK).to_string()
    } else {
        PackedFields::unpack(raw)
            .to_datetime()?
            .format(DATE_FORMAT)
            .to_string()
    };
    Some(truncate_chars(&text, MAX_TIMESTAMP_LEN))
}
