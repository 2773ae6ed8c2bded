//! validex-cli - thin driver over `validex::verify_batch`.
//!
//! Takes email addresses as argv, runs them through the batch pipeline
//! with default scheduling, and prints progress to stderr and the final
//! aggregate as JSON to stdout. File upload parsing, an HTTP front-end,
//! and a full operator CLI are out of scope; this binary exists only to
//! exercise the library.

#![warn(clippy::all, clippy::pedantic)]

use std::env::args;

use validex::{SchedulerConfig, verify_batch};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let addresses: Vec<String> = args().skip(1).collect();

    if addresses.is_empty() {
        eprintln!("Usage: validex-cli [email address]...");
        return;
    }

    let config = SchedulerConfig::default();

    let outcome = verify_batch(
        &addresses,
        &config,
        |completed, total, verdict| {
            eprintln!("[{completed}/{total}] {} -> {}", verdict.address, verdict.category);
        },
        |aggregate| {
            eprintln!("stats: {}/{} valid so far", aggregate.valid, aggregate.total);
        },
    )
    .await;

    match outcome {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome).expect("BatchOutcome always serializes"));
        }
        Err(e) => eprintln!("error: {e}"),
    }
}
