use std::io::{self, Write};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use serde_json::Value;

use outstack_api::dashboard::build_dashboard;
use outstack_api::lemlist::{LemlistClient, LemlistConfig, build_http_client};
use outstack_api::mailboxes::build_mailbox_report;

#[derive(Parser, Debug)]
#[command(
    name = "outstack-report",
    about = "Run the Outstack pipelines from the command line"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the campaign dashboard against lemlist and print it as JSON.
    Dashboard {
        /// Campaigns processed concurrently (overrides DASHBOARD_BATCH_SIZE).
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Build the mailbox utilization report against lemlist and print it as JSON.
    Mailboxes,
    /// Time the aggregate endpoints of a running server.
    Bench {
        /// Base URL of the running API server.
        #[arg(long, default_value = "http://localhost:8000")]
        server: String,

        /// Per-request timeout in seconds.
        #[arg(long, default_value_t = 600)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Dashboard { batch_size } => {
            let mut config = LemlistConfig::from_env();
            if let Some(batch_size) = batch_size {
                config.dashboard_batch_size = batch_size.max(1);
            }
            let client = upstream_client(&config)?;
            let rows = build_dashboard(&client, &config).await?;
            print_json(&rows)?;
        }
        Command::Mailboxes => {
            let config = LemlistConfig::from_env();
            let client = upstream_client(&config)?;
            let statuses = build_mailbox_report(&client).await?;
            print_json(&statuses)?;
        }
        Command::Bench {
            server,
            timeout_secs,
        } => {
            let http = reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()?;
            let base = server.trim_end_matches('/');
            for path in ["/api/campaigns/dashboard", "/api/mailboxes"] {
                bench_endpoint(&http, &format!("{base}{path}")).await?;
            }
        }
    }

    Ok(())
}

fn upstream_client(config: &LemlistConfig) -> Result<LemlistClient, Box<dyn std::error::Error>> {
    if !config.has_credentials() {
        writeln!(io::stderr(), "error: LEMLIST_API_KEY must be set")?;
        std::process::exit(1);
    }
    let http = build_http_client(config)?;
    Ok(LemlistClient::new(http, config)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

async fn bench_endpoint(
    http: &reqwest::Client,
    url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("GET {url}");
    let started = Instant::now();
    let response = http.get(url).send().await?;
    let status = response.status();
    let body: Value = response.json().await?;
    let elapsed = started.elapsed().as_secs_f64();

    if !status.is_success() {
        println!("  -> {status} after {elapsed:.2}s: {body}");
        return Ok(());
    }

    let items = body.as_array().map(Vec::len).unwrap_or(0);
    let average = if items > 0 { elapsed / items as f64 } else { 0.0 };
    println!("  -> {status}: {items} items in {elapsed:.2}s ({average:.2}s per item)");
    Ok(())
}
