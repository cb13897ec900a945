//! cldurl - Command-line tool for resolving scoped media options into delivery URLs

use std::process::ExitCode;

use cldctx::cli;

fn main() -> ExitCode {
    cli::run()
}
