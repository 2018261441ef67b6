//! Poll a simulated deployment until it reports completion.
//!
//! Run with: `cargo run --example basic_usage`

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use repoll::{PollEvent, PollerBuilder, PollerConfig, WorkError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let progress = Arc::new(AtomicU32::new(0));
    let p = Arc::clone(&progress);

    let poller = PollerBuilder::new()
        .work(move || {
            let p = Arc::clone(&p);
            // Each check finds the deployment a little further along.
            async move { Ok::<u32, WorkError>(p.fetch_add(20, Ordering::SeqCst) + 20) }
        })
        .stop_when(|percent: &u32| *percent >= 100)
        .config(PollerConfig::default().with_delay(Duration::from_millis(300)))
        .build()?;

    let mut events = poller.subscribe();
    poller.start();

    while let Some(event) = events.recv().await {
        match event {
            PollEvent::Poll { result, status } => {
                println!("deployment at {result}% ({status})");
                if status.is_terminal() {
                    break;
                }
            }
            PollEvent::End { .. } => {
                println!("cancelled");
                break;
            }
            PollEvent::Failed { message, .. } => {
                eprintln!("deployment check failed: {message}");
                break;
            }
        }
    }

    println!("final: {:?}", poller.last_result());
    Ok(())
}
