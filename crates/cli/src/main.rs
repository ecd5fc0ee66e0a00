// runstats CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Support text/json/yaml output formats for scripting.
// Design Decision: A current-thread runtime is enough; the only async work is the SQLite reader.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "runstats=info,runstats_core=info,runstats_storage=info,runstats_report=info";
const QUIET_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(name = "runstats")]
#[command(about = "runstats - Aggregate evalscope benchmark results and render HTML reports")]
#[command(version)]
pub struct Cli {
    /// Output format for command summaries
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub output_format: String,

    /// Only log warnings and errors
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect result bundles and export raw records and per-config statistics
    Aggregate(commands::aggregate::AggregateArgs),

    /// Render a CSV/JSON export as a static HTML report
    Report(commands::report::ReportArgs),
}

fn init_tracing(quiet: bool) {
    let default_filter = if quiet {
        QUIET_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded .env from {:?}", path);
    }

    let output_format = output::OutputFormat::from_str(&cli.output_format);

    match cli.command {
        Commands::Aggregate(args) => commands::aggregate::run(args, output_format, cli.quiet).await,
        Commands::Report(args) => commands::report::run(args, output_format, cli.quiet),
    }
}
