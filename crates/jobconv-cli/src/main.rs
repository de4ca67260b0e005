//! jobconv CLI - convert job posting CSV files for JOBINS
//!
//! This is the main entry point for the jobconv CLI application, providing
//! commands for converting source CSV files through a mapping document,
//! classifying job titles and inspecting the taxonomy.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::Instrument;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // The oracle API key may come from a .env file
    dotenv::dotenv().ok();

    // Set up colored output
    control::set_override(cli.use_color());

    // Logging reads the [logging] section, so config comes first
    let config = Config::load_with_file(cli.config.as_deref());

    let _log_guard = match init_logging(&cli, config.as_ref().ok()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    let span = logging::root_span(cli.command.name());
    let result = match config {
        Ok(config) => run(cli, config).instrument(span).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!(
            "{}",
            error::format_error(&e, control::SHOULD_COLORIZE.should_colorize())
        );

        if e.should_show_help() {
            eprintln!("\nFor more information, try '--help'");
        }

        // process::exit skips destructors; flush the log file first
        drop(_log_guard);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let mut output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);
    output.set_show_progress(config.output.progress);

    tracing::info!(
        command = cli.command.name(),
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Convert(args) => handlers::handle_convert(args, &config, &mut output).await,
        Commands::Classify(args) => handlers::handle_classify(args, &config, &mut output).await,
        Commands::Validate(args) => handlers::handle_validate(args, &config, &mut output).await,
        Commands::Taxonomy(args) => handlers::handle_taxonomy(args, &config, &mut output).await,
        Commands::Config(args) => handlers::handle_config(args, &config, &mut output).await,
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(
    cli: &Cli,
    config: Option<&Config>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);

    if let Some(config) = config {
        logging_config.merge_with_file(&config.logging, verbosity);
    }

    // Apply environment overrides
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
