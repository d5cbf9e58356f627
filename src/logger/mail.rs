//! Mail sink: one message per event, piped to a sendmail-compatible program.

#![allow(missing_docs)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::dual::MailSink;
use crate::core::config::MailConfig;

#[derive(Debug, Clone)]
pub struct SendmailSink {
    program: PathBuf,
    recipients: String,
    from: String,
    subject: String,
}

impl SendmailSink {
    #[must_use]
    pub fn from_config(config: &MailConfig) -> Self {
        Self {
            program: config.sendmail.clone(),
            recipients: config.recipients.clone(),
            from: config.from.clone(),
            subject: config.subject.clone(),
        }
    }

    /// Header block, blank line, then the body.
    #[must_use]
    pub fn compose(&self, body: &str) -> String {
        format!(
            "To: {}\nFrom: {}\nSubject: {}\n\n{body}",
            self.recipients, self.from, self.subject
        )
    }

    fn deliver(&self, message: &str) -> std::io::Result<()> {
        // -t: recipients from headers, -i: a lone "." does not end the message.
        let mut child = Command::new(&self.program)
            .arg("-ti")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(message.as_bytes()),
            None => Ok(()),
        };
        // Exit status is not inspected.
        child.wait()?;
        written
    }
}

impl MailSink for SendmailSink {
    fn send(&self, body: &str) -> bool {
        match self.deliver(&self.compose(body)) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    program = %self.program.display(),
                    error = %err,
                    "mail delivery failed"
                );
                false
            }
        }
    }
}
