//! repo-analyzer CLI entry point.

use clap::Parser;
use repo_analyzer::cli::{self, Cli, Commands, EXIT_ERROR};
use repo_analyzer::report::View;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "repo_analyzer=info"
    } else if quiet {
        "repo_analyzer=error"
    } else {
        "repo_analyzer=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Structure(args) => cli::run_view(View::Structure, args),
        Commands::Dependencies(args) => cli::run_view(View::Dependencies, args),
        Commands::Complexity(args) => cli::run_view(View::Complexity, args),
        Commands::Quality(args) => cli::run_quality(args),
        Commands::Info(args) => cli::run_info(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
