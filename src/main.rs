use anyhow::Result;
use chrono::Utc;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use sls_rule_activity::commands;
use sls_rule_activity::config::{
    resolve_base_url, should_skip_verify, QueryConfig, Region, DEFAULT_INPUT, DEFAULT_PAGE_DELAY_MS,
    DEFAULT_PAGE_SIZE, DEFAULT_WINDOWS, DEFAULT_WINDOW_DAYS,
};
use sls_rule_activity::sls_api::TOKEN_URL;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sls-rule-activity")]
#[command(about = "Security rule hit history from Strata Logging Service", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase diagnostic logging (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query rule hits per time window and export JSONL + summary CSV
    ///
    /// Credentials come from --client-id/--client-secret or the
    /// SLS_CLIENT_ID, SLS_CLIENT_SECRET / SLS_CLIENT_SECRET_FILE variables.
    Query {
        /// Rule lookup CSV (columns: uuid, name, device_group)
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// SLS region
        #[arg(long, value_enum, default_value_t = Region::Eu)]
        region: Region,

        /// Full API base URL, overrides --region
        #[arg(long)]
        base_url: Option<String>,

        /// OAuth2 token endpoint
        #[arg(long, default_value = TOKEN_URL)]
        token_url: String,

        /// Service-account client id (default: $SLS_CLIENT_ID)
        #[arg(long)]
        client_id: Option<String>,

        /// Service-account client secret (default: $SLS_CLIENT_SECRET or $SLS_CLIENT_SECRET_FILE)
        #[arg(long)]
        client_secret: Option<String>,

        /// Skip TLS certificate verification (insecure, labs only)
        #[arg(long)]
        insecure: bool,

        /// Only count logs of this type (e.g., traffic, threat)
        #[arg(long)]
        log_type: Option<String>,

        /// Directory for rawlogs/ and the summary CSV
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Number of windows to query, most recent first (max 120)
        #[arg(long, default_value_t = DEFAULT_WINDOWS)]
        windows: usize,

        /// Length of each window in days (max 3660)
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        window_days: i64,

        /// Records requested per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,

        /// Pause between pages in milliseconds
        #[arg(long, default_value_t = DEFAULT_PAGE_DELAY_MS)]
        page_delay_ms: u64,
    },

    /// Aggregate a summary CSV per rule and list rules without hits
    Summarize {
        /// Summary CSV written by `query`
        summary_csv: String,

        /// Write per-rule totals to this CSV file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show the time windows a query run would use
    Windows {
        /// Reference time in RFC3339 UTC (default: now)
        #[arg(long)]
        now: Option<String>,

        /// Number of windows (max 120)
        #[arg(long, default_value_t = DEFAULT_WINDOWS)]
        windows: usize,

        /// Length of each window in days (max 3660)
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        window_days: i64,

        /// Output format: table or json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List built-in SLS regions and their base URLs
    Regions,

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "sls_rule_activity=info",
        _ => "sls_rule_activity=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Query {
            input,
            region,
            base_url,
            token_url,
            client_id,
            client_secret,
            insecure,
            log_type,
            output_dir,
            windows,
            window_days,
            page_size,
            page_delay_ms,
        } => {
            let config = QueryConfig {
                input,
                base_url: resolve_base_url(region, base_url.as_deref()),
                token_url,
                skip_verify: should_skip_verify(insecure),
                log_type,
                output_dir,
                windows,
                window_days,
                page_size,
                page_delay: Duration::from_millis(page_delay_ms),
            };
            commands::query::run(
                &config,
                client_id.as_deref(),
                client_secret.as_deref(),
                Utc::now(),
            )
            .await
            .map(|_| ())
        }
        Commands::Summarize {
            summary_csv,
            output,
        } => commands::summarize::run(&summary_csv, output.as_deref()),
        Commands::Windows {
            now,
            windows,
            window_days,
            format,
        } => commands::windows::run(now.as_deref(), windows, window_days, &format),
        Commands::Regions => {
            commands::regions::run();
            Ok(())
        }
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "sls-rule-activity", &mut std::io::stdout());
            Ok(())
        }
    }
}
