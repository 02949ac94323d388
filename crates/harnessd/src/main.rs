//! Command-line entry point for the harness server.

use std::process::ExitCode;

#[expect(
    clippy::print_stderr,
    reason = "telemetry may not be installed when startup fails"
)]
fn main() -> ExitCode {
    match harnessd::run_server() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("harnessd: {error}");
            ExitCode::FAILURE
        }
    }
}
