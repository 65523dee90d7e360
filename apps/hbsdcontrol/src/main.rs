#![allow(clippy::print_stderr)]

use anyhow::Result;
use clap::Parser;
use hbsd_extattr::{SystemStore, effective_uid_is_root};
use hbsd_logger::{Logger, LoggerError};
use hbsd_pax::FeatureControl;
use hbsdcontrol::args::{Cli, Commands};
use hbsdcontrol::commands::{ensure_privileged, execute};
use hbsdcontrol::settings::{LogSettings, load_settings};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("hbsdcontrol: {err}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let settings = load_settings(cli.config.as_deref())?;
    let options = settings.options(cli);
    let _logger = init_logger(&settings.log, options.verbosity)?;
    tracing::debug!(?options, "Resolved options");

    let Commands::Pax { action } = &cli.command;
    ensure_privileged(action, effective_uid_is_root())?;

    let control = FeatureControl::new(SystemStore::new(), options);
    let outcome = execute(&control, action, &mut std::io::stdout().lock(), &mut std::io::stderr())?;

    Ok(outcome.is_success())
}

fn init_logger(log: &LogSettings, verbosity: u8) -> Result<Logger, LoggerError> {
    let builder = Logger::builder().name(env!("CARGO_PKG_NAME")).verbosity(verbosity).console(true);
    let builder = match &log.filter {
        Some(filter) => builder.env_filter(filter.as_str()),
        None => builder,
    };

    match &log.directory {
        Some(directory) => builder.path(directory).json(log.json).init(),
        None => builder.init(),
    }
}
