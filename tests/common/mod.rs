//! Shared harness for CLI integration tests.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::os::unix::net::UnixDatagram;
use std::process::{Command, ExitStatus, Output};
use std::time::Duration;

pub struct CliResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

/// The `rwatch` binary with a scrubbed environment and debug diagnostics.
pub fn rwatch_command(args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_rwatch"));
    command
        .args(args)
        .env_remove("RWATCH_MAIL_RECIPIENTS")
        .env_remove("RWATCH_JOURNAL_DIR")
        .env_remove("RWATCH_POLL_INTERVAL_SECS")
        .env_remove("RWATCH_DETACHED")
        .env("RWATCH_LOG", "debug");
    command
}

/// Run the `rwatch` binary with `args` and keep a per-case log of its output.
pub fn run_cli_case(case_name: &str, args: &[&str]) -> CliResult {
    let output = rwatch_command(args)
        .output()
        .expect("failed to run rwatch binary");
    record_case(case_name, args, output)
}

/// Keep a per-case log of a finished run.
pub fn record_case(case_name: &str, args: &[&str], output: Output) -> CliResult {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    let log_dir = std::env::temp_dir().join("rwatch-cli-logs");
    std::fs::create_dir_all(&log_dir).expect("create log dir");
    let log_path = log_dir.join(format!("{case_name}.log"));
    std::fs::write(
        &log_path,
        format!(
            "args: {args:?}\nstatus: {}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}\n",
            output.status
        ),
    )
    .expect("write case log");

    CliResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Receive syslog datagrams until one contains `needle` or the socket's read
/// timeout expires. Returns every record received, in order.
pub fn recv_until(socket: &UnixDatagram, needle: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut buf = [0u8; 2048];
    while let Ok(n) = socket.recv(&mut buf) {
        let record = String::from_utf8_lossy(&buf[..n]).into_owned();
        let done = record.contains(needle);
        records.push(record);
        if done {
            break;
        }
    }
    records
}

/// A scratch deployment: journal dir, fake sendmail, syslog socket path and a
/// config file wiring them together.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub journal_dir: PathBuf,
    pub mail_out: PathBuf,
    pub syslog_socket: PathBuf,
    pub config_path: PathBuf,
}

/// Separator the fake sendmail writes after each message.
pub const MAIL_SEPARATOR: &str = "--- end of mail ---";

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal_dir = dir.path().join("controllers");
        std::fs::create_dir_all(&journal_dir).expect("journal dir");

        let mail_out = dir.path().join("mail.out");
        let sendmail = dir.path().join("sendmail");
        std::fs::write(
            &sendmail,
            format!(
                "#!/bin/sh\ncat >> '{0}'\necho >> '{0}'\necho '{MAIL_SEPARATOR}' >> '{0}'\n",
                mail_out.display()
            ),
        )
        .expect("write sendmail");
        std::fs::set_permissions(&sendmail, std::fs::Permissions::from_mode(0o755))
            .expect("chmod sendmail");

        let syslog_socket = dir.path().join("log.sock");
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!(
                "[mail]\nsendmail = '{}'\nrecipients = 'ops@example.com'\n\n\
                 [syslog]\nsocket = '{}'\nident = 'rwatch-test'\n\n\
                 [daemon]\npoll_interval_secs = 1\n\n\
                 [hal]\njournal_dir = '{}'\n",
                sendmail.display(),
                syslog_socket.display(),
                journal_dir.display()
            ),
        )
        .expect("write config");

        Self {
            dir,
            journal_dir,
            mail_out,
            syslog_socket,
            config_path,
        }
    }

    pub fn add_controller(&self, name: &str, journal: &str) -> PathBuf {
        let path = self.journal_dir.join(format!("{name}.toml"));
        std::fs::write(&path, journal).expect("write journal");
        path
    }

    /// Replace a journal's contents in one step, so a concurrent reader never
    /// sees a half-written file.
    pub fn replace_journal(&self, path: &Path, journal: &str) {
        let staging = self.dir.path().join("journal.staging");
        std::fs::write(&staging, journal).expect("write staged journal");
        std::fs::rename(&staging, path).expect("swap journal");
    }

    /// Listen on the configured syslog socket.
    pub fn syslog_listener(&self) -> UnixDatagram {
        let socket = UnixDatagram::bind(&self.syslog_socket).expect("bind syslog socket");
        socket
            .set_read_timeout(Some(Duration::from_secs(10)))
            .expect("read timeout");
        socket
    }

    pub fn config_arg(&self) -> &str {
        self.config_path.to_str().expect("utf-8 temp path")
    }

    /// Bodies of every mail the fake sendmail received.
    pub fn mails(&self) -> Vec<String> {
        read_mails(&self.mail_out)
    }
}

fn read_mails(path: &Path) -> Vec<String> {
    let raw = std::fs::read_to_string(path).unwrap_or_default();
    raw.split(MAIL_SEPARATOR)
        .filter_map(|chunk| {
            chunk
                .split_once("\n\n")
                .map(|(_, body)| body.trim().to_string())
        })
        .collect()
}
