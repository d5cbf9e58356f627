//! Dual-sink notification: every event goes to the system log and to mail,
//! independently. A failing sink never affects the other or the caller.

#![allow(missing_docs)]

use super::syslog::Severity;
use crate::core::config::Config;
use crate::monitor::classifier::RenderedMessage;

/// Severity-tagged text sink. Must absorb its own failures.
pub trait LogSink {
    fn log(&self, severity: Severity, text: &str);
}

/// One-message-per-call mail sink. Returns whether the hand-off succeeded.
pub trait MailSink {
    fn send(&self, body: &str) -> bool;
}

/// Fans rendered events out to the configured sinks.
pub struct Dispatcher {
    log: Box<dyn LogSink>,
    mail: Option<Box<dyn MailSink>>,
    event_severity: Severity,
    lifecycle_severity: Severity,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        log: Box<dyn LogSink>,
        mail: Option<Box<dyn MailSink>>,
        event_severity: Severity,
        lifecycle_severity: Severity,
    ) -> Self {
        Self {
            log,
            mail,
            event_severity,
            lifecycle_severity,
        }
    }

    /// Syslog + sendmail sinks as configured.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let log = super::syslog::SyslogSink::new(
            &config.syslog.socket,
            config.syslog.ident.clone(),
            config.syslog.facility,
        );
        let mail = config.mail.enabled.then(|| {
            Box::new(super::mail::SendmailSink::from_config(&config.mail)) as Box<dyn MailSink>
        });
        Self::new(
            Box::new(log),
            mail,
            config.syslog.event_severity,
            config.syslog.lifecycle_severity,
        )
    }

    /// Newly arrived event: log sink and mail sink.
    pub fn notify(&self, message: &RenderedMessage) {
        self.log.log(self.event_severity, message.text());
        self.mail_only(message);
    }

    /// History report entry: mail sink only.
    pub fn mail_only(&self, message: &RenderedMessage) {
        if let Some(mail) = &self.mail {
            if !mail.send(message.text()) {
                tracing::debug!("mail sink did not accept message");
            }
        }
    }

    /// Startup/shutdown notices.
    pub fn lifecycle(&self, text: &str) {
        self.log.log(self.lifecycle_severity, text);
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mail_enabled", &self.mail.is_some())
            .field("event_severity", &self.event_severity)
            .field("lifecycle_severity", &self.lifecycle_severity)
            .finish_non_exhaustive()
    }
}
