//! `appsync` binary: parse arguments, set up logging, and dispatch.
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use appsync_cli::cli::{Cli, Command};
use appsync_cli::commands;
use appsync_cli::engine::Operation;
use appsync_cli::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if matches!(args.command, Command::Version) {
        commands::version::run();
        return Ok(());
    }

    let json = matches!(&args.command, Command::List(opts) if opts.json);
    init_subscriber(args.verbose, args.command.name(), json);
    let log = Logger::new(args.command.name());

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupt);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        log.warn(&format!("cannot install Ctrl-C handler: {e}"));
    }

    match &args.command {
        Command::List(opts) => commands::list::run(&args.global, opts, &log),
        Command::Show(opts) => commands::show::run(&args.global, opts, &log),
        Command::Backup => commands::sync::run(&args.global, Operation::Backup, &log, &interrupt),
        Command::Restore => {
            commands::sync::run(&args.global, Operation::Restore, &log, &interrupt)
        }
        Command::Uninstall => {
            commands::sync::run(&args.global, Operation::Uninstall, &log, &interrupt)
        }
        Command::Version => Ok(()),
    }
}
