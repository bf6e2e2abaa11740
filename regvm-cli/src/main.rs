//! regvm CLI: deploy, run, validate and disassemble contracts.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage, input or store error
//! - 2: Validation failure
//! - 3: The run ended in a fault

mod args;
mod commands;
mod logging;

use args::{Cli, Command};
use clap::error::ErrorKind;
use clap::Parser;
use std::process;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            process::exit(code);
        }
    };

    logging::init(cli.global.verbose);

    let result = match &cli.command {
        Command::Deploy(args) => commands::deploy(&cli.global, args),
        Command::Run(args) => commands::run(&cli.global, args),
        Command::Validate(args) => commands::validate(&cli.global, args),
        Command::Disassemble(args) => commands::disassemble(&cli.global, args),
    };

    if let Err(code) = result {
        process::exit(code);
    }
}
