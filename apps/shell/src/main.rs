mod args;
mod handlers;

use crate::args::{Cli, Commands};
use anyhow::{Context, Result};
use clap::Parser;
use sreg::ScriptHost;
use sreg::domain::config::AppConfig;
use sreg::kernel::config::load_config;
use sreg_logger::{LevelFilter, LogFormat, Logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config: AppConfig =
        load_config(cli.config.as_ref()).context("Critical: Configuration is malformed")?;
    let _logger = init_logger(&config)?;

    let host = ScriptHost::from_config(config)?;
    if cli.debug {
        host.registry().set_debug_mode(true);
    }

    tracing::debug!(command = ?cli.command, "Running command");
    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::List {} => handlers::list(&host, &mut out)?,
        Commands::Groups {} => handlers::groups(&host, &mut out)?,
        Commands::Ordered { context } => {
            let context = handlers::read_context(context.as_deref())?;
            handlers::ordered(&host, context.as_ref(), &mut out)?;
        },
        Commands::Render { id, context } => {
            let context = handlers::read_context(context.as_deref())?;
            handlers::render(&host, &id, context.as_ref(), &mut out)?;
        },
        Commands::Deliver { id, context } => {
            let context = handlers::read_context(context.as_deref())?;
            handlers::deliver(&host, &id, context.as_ref(), &mut out)?;
        },
    }

    Ok(())
}

fn init_logger(config: &AppConfig) -> Result<Logger> {
    let level = config
        .logging
        .level
        .parse::<LevelFilter>()
        .with_context(|| format!("Invalid logging.level '{}'", config.logging.level))?;
    let builder = Logger::builder().name(env!("CARGO_BIN_NAME")).level(level);

    let logger = match &config.logging.directory {
        Some(directory) => {
            let format = if config.logging.json { LogFormat::Json } else { LogFormat::Plain };
            builder.path(directory).format(format).init()?
        },
        None => builder.init()?,
    };
    Ok(logger)
}
