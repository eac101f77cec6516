//! stylus-lens - command-line front end and language server for Stylus

use std::process::ExitCode;

use stylus_lens::cli;

fn main() -> ExitCode {
    cli::run()
}
