//! Run an unbounded heartbeat poller and cancel it from the outside.
//!
//! Run with: `cargo run --example manual_stop`

use std::time::Duration;

use repoll::{PollEvent, PollerBuilder, PollerConfig, WorkError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let poller = PollerBuilder::new()
        .work({
            let mut beats = 0u32;
            move || {
                beats += 1;
                let beat = beats;
                async move { Ok::<u32, WorkError>(beat) }
            }
        })
        .config(PollerConfig::default().with_delay(Duration::from_millis(200)))
        .build()?;

    let mut events = poller.subscribe();
    poller.start();

    // No stop condition and no retry limit: this would beat forever.
    tokio::time::sleep(Duration::from_millis(900)).await;
    poller.stop();

    while let Some(event) = events.recv().await {
        match event {
            PollEvent::Poll { result, status } => println!("heartbeat {result} ({status})"),
            PollEvent::End { last_result, .. } => {
                println!("stopped after {} heartbeats", last_result.unwrap_or(0));
                break;
            }
            PollEvent::Failed { message, .. } => {
                eprintln!("heartbeat failed: {message}");
                break;
            }
        }
    }

    Ok(())
}
