//! Integration tests for the `rwatch` CLI surface.

mod common;

use std::os::unix::net::UnixDatagram;
use std::process::{Command, Stdio};

use common::Fixture;

const JOURNAL: &str = r#"
[system]
model = "ARC-1220"

[[events]]
category = "raid_set"
type = 0
owner = "Raid Set # 00"
at = "2006-03-15T09:30:00"

[[events]]
category = "volume_set"
type = 12
owner = "ARC-1220-VOL#00"
ticks = 5000

[[events]]
category = "device"
type = 1
channel = 2
ticks = 6000
"#;

const APPENDED: &str = r#"
[[events]]
category = "hardware_monitor"
type = 5
ticks = 7000
"#;

const FAN_FAILED: &str = "Hw Monitor          Fan Failed";

fn drain(socket: &UnixDatagram) -> Vec<String> {
    socket.set_nonblocking(true).expect("nonblocking");
    let mut records = Vec::new();
    let mut buf = [0u8; 2048];
    while let Ok(n) = socket.recv(&mut buf) {
        records.push(String::from_utf8_lossy(&buf[..n]).into_owned());
    }
    records
}

#[test]
fn help_command_prints_usage() {
    let result = common::run_cli_case("help_command_prints_usage", &["--help"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("Usage: rwatch [OPTIONS]"),
        "missing help banner; log: {}",
        result.log_path.display()
    );
    assert!(result.stdout.contains("--printall"));
    assert!(result.stdout.contains("--daemonize"));
}

#[test]
fn version_command_prints_version() {
    let result = common::run_cli_case("version_command_prints_version", &["--version"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("rwatch"),
        "missing version output; log: {}",
        result.log_path.display()
    );
}

#[test]
fn unknown_flag_exits_with_status_one() {
    let result = common::run_cli_case("unknown_flag_exits_with_status_one", &["--bogus"]);
    assert_eq!(
        result.status.code(),
        Some(1),
        "log: {}",
        result.log_path.display()
    );
}

#[test]
fn conflicting_modes_exit_with_status_one() {
    let result = common::run_cli_case("conflicting_modes_exit_with_status_one", &["-p", "-d"]);
    assert_eq!(result.status.code(), Some(1));
}

#[test]
fn no_controller_found_is_fatal() {
    let fixture = Fixture::new();
    let result = common::run_cli_case(
        "no_controller_found_is_fatal",
        &["--config", fixture.config_arg(), "--cycles", "1"],
    );
    assert_eq!(
        result.status.code(),
        Some(1),
        "log: {}",
        result.log_path.display()
    );
    assert!(
        result.stderr.contains("no controller found"),
        "log: {}",
        result.log_path.display()
    );
    assert!(fixture.mails().is_empty());
}

#[test]
fn missing_config_file_is_fatal() {
    let result = common::run_cli_case(
        "missing_config_file_is_fatal",
        &["--config", "/nonexistent/rwatch/config.toml"],
    );
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("RW-1002"));
}

#[test]
fn printall_reports_newest_first_and_mails_each_event() {
    let fixture = Fixture::new();
    fixture.add_controller("ctrl0", JOURNAL);

    let result = common::run_cli_case(
        "printall_reports_newest_first_and_mails_each_event",
        &["--printall", "--config", fixture.config_arg()],
    );
    assert!(
        result.status.success(),
        "log: {}",
        result.log_path.display()
    );

    let lines: Vec<&str> = result.stdout.lines().collect();
    assert!(lines[0].starts_with("Date-Time"), "{lines:?}");
    assert!(lines[2].starts_with("6000 IDE Channel # 3"), "{lines:?}");
    assert!(lines[3].starts_with("5000 ARC-1220-VOL#00"), "{lines:?}");
    assert_eq!(
        lines[4],
        "Wed, 15 Mar 2006 09:30:00 Raid Set # 00       Create RaidSet"
    );

    let mails = fixture.mails();
    assert_eq!(mails.len(), 3, "{mails:?}");
    assert_eq!(mails[0], "IDE Channel # 3     Device Removed");
    assert_eq!(mails[2], "Raid Set # 00       Create RaidSet");
}

#[test]
fn daemon_baseline_suppresses_existing_history() {
    let fixture = Fixture::new();
    fixture.add_controller("ctrl0", JOURNAL);
    let syslog = fixture.syslog_listener();

    let result = common::run_cli_case(
        "daemon_baseline_suppresses_existing_history",
        &["--config", fixture.config_arg(), "--cycles", "2"],
    );
    assert!(
        result.status.success(),
        "log: {}",
        result.log_path.display()
    );
    assert!(fixture.mails().is_empty(), "history must not be mailed");

    let mut buf = [0u8; 1024];
    let n = syslog.recv(&mut buf).expect("startup notice");
    let notice = String::from_utf8_lossy(&buf[..n]);
    assert!(notice.starts_with("<29>"), "{notice}");
    assert!(notice.ends_with("Startup successful! Waiting for new events now..."));

    syslog.set_nonblocking(true).expect("nonblocking");
    assert!(
        syslog.recv(&mut buf).is_err(),
        "no event notices expected in foreground mode"
    );
}

#[test]
fn appended_event_reaches_syslog_and_mail_exactly_once() {
    let fixture = Fixture::new();
    let journal = fixture.add_controller("ctrl0", JOURNAL);
    let syslog = fixture.syslog_listener();

    let args = ["--config", fixture.config_arg(), "--cycles", "4"];
    let child = common::rwatch_command(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn rwatch");

    let startup = common::recv_until(&syslog, "Startup successful!");
    assert!(
        startup.last().is_some_and(|r| r.starts_with("<29>")),
        "{startup:?}"
    );
    fixture.replace_journal(&journal, &format!("{JOURNAL}{APPENDED}"));

    let result = common::record_case(
        "appended_event_reaches_syslog_and_mail_exactly_once",
        &args,
        child.wait_with_output().expect("wait for rwatch"),
    );
    assert!(
        result.status.success(),
        "log: {}",
        result.log_path.display()
    );

    let records = drain(&syslog);
    let events: Vec<&String> = records.iter().filter(|r| r.starts_with("<26>")).collect();
    assert_eq!(events.len(), 1, "{records:?}");
    assert!(events[0].ends_with(FAN_FAILED), "{records:?}");
    assert_eq!(fixture.mails(), [FAN_FAILED]);
}

#[test]
fn daemonize_detaches_and_announces_shutdown_on_sigterm() {
    let fixture = Fixture::new();
    let journal = fixture.add_controller("ctrl0", JOURNAL);
    let syslog = fixture.syslog_listener();

    // The cycle cap bounds the detached child if the test fails before SIGTERM.
    let result = common::run_cli_case(
        "daemonize_detaches_and_announces_shutdown_on_sigterm",
        &["--daemonize", "--config", fixture.config_arg(), "--cycles", "60"],
    );
    assert!(
        result.status.success(),
        "log: {}",
        result.log_path.display()
    );
    let pid: u32 = result
        .stdout
        .trim()
        .strip_prefix("forking into background (")
        .and_then(|rest| rest.strip_suffix(")."))
        .and_then(|pid| pid.parse().ok())
        .unwrap_or_else(|| panic!("unexpected stdout: {:?}", result.stdout));

    let startup = common::recv_until(&syslog, "Startup successful!");
    assert!(
        startup.last().is_some_and(|r| r.starts_with("<29>")),
        "{startup:?}"
    );

    fixture.replace_journal(&journal, &format!("{JOURNAL}{APPENDED}"));
    let events = common::recv_until(&syslog, FAN_FAILED);
    assert!(
        events
            .last()
            .is_some_and(|r| r.starts_with("<26>") && r.ends_with(FAN_FAILED)),
        "{events:?}"
    );

    let killed = Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .status()
        .expect("run kill");
    assert!(killed.success(), "detached pid {pid} not running");

    let shutdown = common::recv_until(&syslog, "Shutdown requested!");
    assert!(
        shutdown
            .last()
            .is_some_and(|r| r.starts_with("<29>") && r.ends_with("Shutdown requested!")),
        "{shutdown:?}"
    );
    assert_eq!(fixture.mails(), [FAN_FAILED]);
}
