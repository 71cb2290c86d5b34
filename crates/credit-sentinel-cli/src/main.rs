mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::loans::ListArgs;
use commands::portfolio::{PortfolioArgs, SeedArgs};
use commands::risk::ScoreArgs;
use commands::stress::StressArgs;

/// Deterministic loan risk scoring
#[derive(Parser)]
#[command(
    name = "sentinel",
    version,
    about = "Deterministic, explainable loan risk scoring",
    long_about = "A CLI for scoring loans against the credit sentinel rule set, \
                  listing and filtering a loan book, aggregating portfolio KPIs \
                  and projecting scores under rate and revenue shocks. Every \
                  score is traceable to named rules."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single loan and explain the result
    Score(ScoreArgs),
    /// List loans, filtered by status and a borrower/loan id search
    List(ListArgs),
    /// Aggregate KPIs, distributions and a screening list for a loan book
    Portfolio(PortfolioArgs),
    /// Project a loan's score under a rate and revenue shock
    Stress(StressArgs),
    /// Score the demo portfolio and print it with its KPIs
    Seed(SeedArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Logs go to stderr so piped JSON on stdout stays parseable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Score(args) => commands::risk::run_score(args),
        Commands::List(args) => commands::loans::run_list(args),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args),
        Commands::Stress(args) => commands::stress::run_stress(args),
        Commands::Seed(args) => commands::portfolio::run_seed(args),
        Commands::Version => {
            println!("sentinel {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
