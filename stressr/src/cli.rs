use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::parse_run_time;
use crate::target::FunctionType;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable metric table.
    HumanReadable,
    /// A single JSON object on stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "stressr",
    author,
    version,
    about = "Run Locust load tests and normalize their HTML reports",
    long_about = "stressr drives a Locust load test against a function endpoint and turns the generated HTML report into a flat statistics record (p50, p90, Requests, Fails, ...).\n\nThe Aggregated summary rows of the report are skipped and the AverageSize/p100 columns are never reported.\n\nLog verbosity is controlled with STRESSR_LOG (e.g. STRESSR_LOG=debug); logs go to stderr.",
    after_help = "Examples:\n  stressr parse /tmp/report.html --output json\n  stressr run --function-type http --url http://127.0.0.1:8080/hello --num-users 20 --run-time 1m\n  stressr run --config stress.yaml --include-report\n  stressr clean -y"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize an existing Locust HTML report
    Parse(ParseArgs),

    /// Run a load test, then normalize and archive its report
    #[command(
        long_about = "Run Locust headless against the target and normalize the report it writes.\n\nValues are taken from CLI flags, then environment variables, then the --config profile, then built-in defaults."
    )]
    Run(RunArgs),

    /// Remove archived HTML reports
    Clean(CleanArgs),
}

/// Flags shared by every command that normalizes a report.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Embed the raw HTML report under `report_html`
    #[arg(long)]
    pub include_report: bool,

    /// Fail when header and data cell counts differ instead of truncating
    #[arg(long)]
    pub strict: bool,

    /// Row index holding an aggregated summary (repeatable; defaults to 2 and 5)
    #[arg(long = "aggregated-row", value_name = "INDEX")]
    pub aggregated_rows: Vec<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Path to the HTML report
    pub report: PathBuf,

    #[command(flatten)]
    pub report_args: ReportArgs,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// YAML run profile (camelCase keys, same names as the flags)
    #[arg(long, env = "STRESSR_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Target kind
    #[arg(long, value_enum, env = "STRESSR_FUNCTION_TYPE")]
    pub function_type: Option<FunctionType>,

    /// Number of concurrent Locust users (default 6)
    #[arg(long, short = 'u', env = "STRESSR_NUM_USERS")]
    pub num_users: Option<u64>,

    /// Users spawned per second (default 10)
    #[arg(long, short = 'r', env = "STRESSR_SPAWN_RATE")]
    pub spawn_rate: Option<u64>,

    /// Test duration: bare seconds or e.g. 30s, 2m (default 30s)
    #[arg(long, short = 't', env = "STRESSR_RUN_TIME", value_parser = parse_run_time)]
    pub run_time: Option<Duration>,

    /// Sync or Async function invocation (event targets)
    #[arg(long, env = "STRESSR_INVOCATION_TYPE")]
    pub invocation_type: Option<String>,

    /// Service name (event targets)
    #[arg(long)]
    pub service_name: Option<String>,

    /// Function name (event targets)
    #[arg(long)]
    pub function_name: Option<String>,

    /// Version or alias (event targets, default LATEST)
    #[arg(long, short = 'q')]
    pub qualifier: Option<String>,

    /// Request URL (http targets)
    #[arg(long)]
    pub url: Option<String>,

    /// Request method (http targets, default GET)
    #[arg(long, short = 'm')]
    pub method: Option<String>,

    /// Endpoint host; required for event targets, optional override for http targets
    #[arg(long, env = "STRESSR_HOST")]
    pub host: Option<String>,

    /// Inline payload / request body
    #[arg(long, short = 'p')]
    pub payload: Option<String>,

    /// Read the payload / request body from a file
    #[arg(long, short = 'f', value_name = "FILE")]
    pub payload_file: Option<PathBuf>,

    /// Locust executable (default `locust` from PATH)
    #[arg(long, env = "STRESSR_LOCUST", value_name = "BIN")]
    pub locust: Option<PathBuf>,

    /// Locustfile to run (defaults by target kind)
    #[arg(long, value_name = "FILE")]
    pub locustfile: Option<PathBuf>,

    /// Where Locust writes the HTML report (default: temp dir)
    #[arg(long, env = "STRESSR_REPORT_PATH", value_name = "FILE")]
    pub report_path: Option<PathBuf>,

    /// Directory for archived reports
    #[arg(long, env = "STRESSR_HISTORY_DIR", value_name = "DIR")]
    pub history_dir: Option<PathBuf>,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Do not ask for confirmation
    #[arg(long, short = 'y')]
    pub assume_yes: bool,

    /// Directory for archived reports
    #[arg(long, env = "STRESSR_HISTORY_DIR", value_name = "DIR")]
    pub history_dir: Option<PathBuf>,
}
