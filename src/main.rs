//! # toolbox CLI
//!
//! Command-line front end for the toolbox utilities.
//!
//! ## Usage
//! ```bash
//! toolbox organize ~/Downloads --mode extension
//! toolbox checksum ~/isos/debian.iso
//! ```

mod cli;

use console::style;
use std::process::ExitCode;
use toolbox::ToolboxError;

fn main() -> ExitCode {
    toolbox::init_tracing();
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        // Already shown to the user by the runner's notifier
        Err(ToolboxError::Task(_)) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
