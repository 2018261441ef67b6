use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use std::time::Duration;
use tracing::{info, warn};

use repoll::{PollEvent, PollTask, PollerBuilder, PollerConfig, WorkResult};

/// repoll Integration Example
///
/// Demonstrates the complete repoll workflow by polling a simulated build
/// job until it reports ready, draining the event stream, and printing a
/// final summary of the poller's lifecycle.
#[derive(Parser, Debug)]
#[command(name = "integration-example")]
#[command(about = "repoll Integration Example - Complete workflow demonstration")]
#[command(version = "0.1.0")]
struct Args {
    /// Number of attempts before the simulated job reports ready
    #[arg(short, long, default_value = "4")]
    attempts_until_ready: u32,

    /// Delay between polls in milliseconds
    #[arg(short, long, default_value = "500")]
    delay_ms: u64,

    /// Delay before the first poll in milliseconds
    #[arg(long, default_value = "0")]
    initial_delay_ms: u64,

    /// Give up after this many re-scheduled polls (unbounded if omitted)
    #[arg(short, long)]
    retry_limit: Option<u32>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> PollerConfig {
        let mut config = PollerConfig::default()
            .with_delay(Duration::from_millis(self.delay_ms))
            .with_initial_delay(Duration::from_millis(self.initial_delay_ms));
        if let Some(limit) = self.retry_limit {
            config = config.with_retry_limit(limit);
        }
        config
    }
}

/// State of the simulated build job as seen by one poll.
#[derive(Debug, Clone)]
struct JobSnapshot {
    attempt: u32,
    ready: bool,
}

/// A fake remote job that becomes ready after a fixed number of checks.
struct BuildJobProbe {
    attempts: u32,
    attempts_until_ready: u32,
}

#[async_trait]
impl PollTask for BuildJobProbe {
    type Output = JobSnapshot;

    async fn run(&mut self) -> WorkResult<JobSnapshot> {
        self.attempts += 1;
        // Stand-in for a status request against a real service.
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(JobSnapshot {
            attempt: self.attempts,
            ready: self.attempts >= self.attempts_until_ready,
        })
    }

    async fn is_complete(&mut self, snapshot: &JobSnapshot) -> WorkResult<bool> {
        Ok(snapshot.ready)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    info!(
        attempts_until_ready = args.attempts_until_ready,
        delay_ms = args.delay_ms,
        retry_limit = ?args.retry_limit,
        "starting build-job polling demo"
    );

    let poller = PollerBuilder::new()
        .task(BuildJobProbe {
            attempts: 0,
            attempts_until_ready: args.attempts_until_ready,
        })
        .config(args.config())
        .build()?;

    let mut events = poller.subscribe();
    poller.start();

    while let Some(event) = events.recv().await {
        match event {
            PollEvent::Poll { result, status } => {
                info!(
                    attempt = result.attempt,
                    ready = result.ready,
                    %status,
                    "poll completed"
                );
                if status.is_terminal() {
                    break;
                }
            }
            PollEvent::End { last_result, .. } => {
                warn!(?last_result, "polling cancelled before the job was ready");
                break;
            }
            PollEvent::Failed { cycle, message, .. } => {
                warn!(cycle, %message, "polling failed");
                break;
            }
        }
    }

    let stats = poller.stats();
    println!("job polling finished");
    println!("  poller:  {}", stats.id);
    println!("  status:  {}", stats.status);
    println!("  cycles:  {}", stats.cycles);
    match poller.last_result() {
        Some(snapshot) if snapshot.ready => {
            println!("  result:  ready after {} attempts", snapshot.attempt)
        }
        Some(snapshot) => println!("  result:  not ready (last attempt {})", snapshot.attempt),
        None => println!("  result:  no poll completed"),
    }

    Ok(())
}
