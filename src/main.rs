//! `mdlink` binary entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use mdlink::cli::{Cli, Command};
use mdlink::commands;
use mdlink::logging::{Logger, init_subscriber};

#[allow(clippy::print_stdout)]
fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    if args.command == Command::Version {
        println!("mdlink {}", commands::version());
        return Ok(());
    }

    init_subscriber(args.global.verbose, args.command.name());
    let log = Arc::new(Logger::new(args.command.name()));

    match args.command {
        Command::Init => commands::init::run(&args.global, log.as_ref()),
        Command::Start => commands::start::run(&args.global, &log),
        Command::Reset => commands::reset::run(&args.global, &log),
        Command::Status => commands::status::run(&args.global, log.as_ref()),
        Command::Version => Ok(()),
    }
}
