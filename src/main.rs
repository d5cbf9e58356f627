//! `rwatch` binary entrypoint.

use std::process::ExitCode;

use clap::Parser;
use raid_event_watch::cli_app::{self, Cli};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are "errors" that go to stdout.
            let failed = err.use_stderr();
            let _ = err.print();
            return if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match cli_app::run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("rwatch: {err}");
            ExitCode::FAILURE
        }
    }
}
