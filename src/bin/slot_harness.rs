use anyhow::{Context, Result};
use bluegreen_probe::{
    config::Config,
    harness::{compare_slots, HttpSlotApi, LoadHarness, StatusSink, StatusView},
    telemetry,
};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "slot-harness", about = "Drive load against a blue/green slot")]
struct Cli {
    /// Slot base URL; defaults to `harness.base_url` from configuration.
    #[arg(long, global = true)]
    target: Option<String>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fire N concurrent /stress calls and report aggregate statistics.
    Stress {
        #[arg(short = 'n', long, default_value_t = 100)]
        requests: u32,
    },
    /// Fetch /status once.
    Status,
    /// Poll /status on a fixed interval until Ctrl+C.
    Watch {
        /// Seconds between polls; defaults to `harness.status_interval_secs`.
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Run the same stress batch against the target and a standby slot.
    Compare {
        #[arg(long)]
        standby: String,
        #[arg(short = 'n', long, default_value_t = 100)]
        requests: u32,
    },
    /// Clear the target's counters.
    Reset,
}

/// Prints each status poll on stdout.
struct ConsoleSink {
    json: bool,
}

impl StatusSink for ConsoleSink {
    fn render(&self, view: &StatusView) {
        match (self.json, view) {
            (true, StatusView::Online(status)) => match serde_json::to_string(status) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "failed to encode status"),
            },
            (true, StatusView::Unreachable { reason }) => {
                println!("{}", serde_json::json!({ "error": reason }))
            }
            (false, view) => println!("{view}\n"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_cli_tracing();

    let cli = Cli::parse();
    let cfg = Config::load()?;
    let base_url = cli.target.clone().unwrap_or(cfg.harness.base_url.clone());
    let timeout = cfg.harness.request_timeout();
    let sink = Arc::new(ConsoleSink { json: cli.json });

    let api = Arc::new(HttpSlotApi::new(&base_url, timeout)?);
    let harness =
        LoadHarness::new(api.clone(), sink.clone()).with_max_requests(cfg.harness.max_requests);

    match cli.command {
        Command::Stress { requests } => {
            let run = harness
                .run_stress_test(requests)
                .await
                .context("stress test rejected")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&run.report)?);
            } else {
                println!("{run}");
            }
        }
        Command::Status => {
            let view = harness.check_status().await;
            if !view.is_online() {
                std::process::exit(2);
            }
        }
        Command::Watch { interval } => {
            let interval = interval
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or_else(|| cfg.harness.status_interval());
            info!(%base_url, interval_secs = interval.as_secs(), "watching slot status");

            harness.check_status().await;
            harness.start_auto_status_check(interval).await;
            telemetry::shutdown_signal().await;
            harness.stop_auto_status_check().await;
        }
        Command::Compare { standby, requests } => {
            let standby_api = Arc::new(HttpSlotApi::new(&standby, timeout)?);
            let standby = LoadHarness::new(standby_api, sink)
                .with_max_requests(cfg.harness.max_requests);
            let comparison = compare_slots(&harness, &standby, requests)
                .await
                .context("comparison rejected")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                println!("{comparison}");
            }
        }
        Command::Reset => {
            let reply = api.reset().await.context("reset failed")?;
            println!("{} ({}) at {}", reply.message, reply.identity, reply.timestamp);
        }
    }

    Ok(())
}
