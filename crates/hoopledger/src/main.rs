// hoopledger entry point.
//
// Startup sequence:
// 1. Parse command-line arguments
// 2. Load config (explicit file, config/, user config dir, or built-in)
// 3. Initialize tracing (stderr, or the configured log file)
// 4. Run the ledger over the input and write the report

use anyhow::Context;
use clap::Parser;
use tracing::info;

use hoopledger::cli::Cli;
use hoopledger::config::{self, LoggingConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, source) =
        config::load_config(cli.config.as_deref()).context("failed to load configuration")?;

    init_tracing(&config.logging)?;
    info!("Config loaded from {}", source);

    let settings = cli.settings(&config);
    hoopledger::run(&settings)?;

    Ok(())
}

/// Initialize tracing. Logs go to stderr unless a log file is configured, so
/// stdout carries only the report.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    use std::sync::Mutex;
    use tracing_subscriber::fmt;
    use tracing_subscriber::fmt::writer::BoxMakeWriter;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .with_context(|| format!("invalid log filter {:?}", logging.filter))?;

    let (writer, ansi) = match &logging.file {
        Some(path) => {
            let path = std::path::Path::new(path);
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            }
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
