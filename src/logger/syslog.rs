//! System log sink: RFC 3164 datagrams on the local syslog socket.
//!
//! The socket is connected lazily on the first message and reconnected on the
//! next message after a send failure. Failures never reach the caller.

#![allow(missing_docs)]

use std::cell::RefCell;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::dual::LogSink;

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Emerg,
    Alert,
    Crit,
    Err,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Severity {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Emerg => libc::LOG_EMERG,
            Self::Alert => libc::LOG_ALERT,
            Self::Crit => libc::LOG_CRIT,
            Self::Err => libc::LOG_ERR,
            Self::Warning => libc::LOG_WARNING,
            Self::Notice => libc::LOG_NOTICE,
            Self::Info => libc::LOG_INFO,
            Self::Debug => libc::LOG_DEBUG,
        }
    }
}

/// Syslog facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facility {
    User,
    Daemon,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
}

impl Facility {
    /// Facility code, already shifted into the priority's upper bits.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::User => libc::LOG_USER,
            Self::Daemon => libc::LOG_DAEMON,
            Self::Local0 => libc::LOG_LOCAL0,
            Self::Local1 => libc::LOG_LOCAL1,
            Self::Local2 => libc::LOG_LOCAL2,
            Self::Local3 => libc::LOG_LOCAL3,
            Self::Local4 => libc::LOG_LOCAL4,
            Self::Local5 => libc::LOG_LOCAL5,
            Self::Local6 => libc::LOG_LOCAL6,
            Self::Local7 => libc::LOG_LOCAL7,
        }
    }
}

/// Build one RFC 3164 record: `<PRI>Mmm dd HH:MM:SS ident[pid]: text`.
#[must_use]
pub fn format_record(
    facility: Facility,
    severity: Severity,
    ident: &str,
    pid: u32,
    at: DateTime<Local>,
    text: &str,
) -> String {
    format!(
        "<{}>{} {ident}[{pid}]: {text}",
        facility.code() | severity.code(),
        at.format("%b %e %H:%M:%S")
    )
}

#[derive(Debug)]
pub struct SyslogSink {
    socket_path: PathBuf,
    ident: String,
    facility: Facility,
    pid: u32,
    conn: RefCell<Option<UnixDatagram>>,
}

impl SyslogSink {
    #[must_use]
    pub fn new(socket_path: impl AsRef<Path>, ident: impl Into<String>, facility: Facility) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            ident: ident.into(),
            facility,
            pid: std::process::id(),
            conn: RefCell::new(None),
        }
    }

    fn send(&self, record: &str) -> std::io::Result<()> {
        let mut conn = self.conn.borrow_mut();
        if conn.is_none() {
            let socket = UnixDatagram::unbound()?;
            socket.connect(&self.socket_path)?;
            *conn = Some(socket);
        }
        let result = conn
            .as_ref()
            .map_or(Ok(0), |socket| socket.send(record.as_bytes()));
        if result.is_err() {
            *conn = None;
        }
        result.map(|_| ())
    }
}

impl LogSink for SyslogSink {
    fn log(&self, severity: Severity, text: &str) {
        let record = format_record(
            self.facility,
            severity,
            &self.ident,
            self.pid,
            Local::now(),
            text,
        );
        if let Err(err) = self.send(&record) {
            tracing::warn!(
                socket = %self.socket_path.display(),
                error = %err,
                "syslog delivery failed"
            );
        }
    }
}
