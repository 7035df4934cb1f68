#![deny(unused)]
//! Container entrypoint: run the staged scaffold on one input.
//!
//! The launcher bind-mounts the package at `/workspace/scaffold`, passes
//! the input as the first argument (stdin as a fallback), and reads the
//! result from stdout. Exit code 1 signals a contained scaffold crash;
//! exit code 2 a harness-side problem (no input, unreadable package).

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use tracing::Level;

use scaffold_shim::{load_staged, run};

/// Directory the launcher stages the package at.
const SCAFFOLD_DIR: &str = "/workspace/scaffold";

#[tokio::main]
async fn main() {
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|raw| Level::from_str(&raw).ok())
        .unwrap_or(Level::INFO);

    let input = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => {
            use std::io::Read;
            let mut buffer = String::new();
            if std::io::stdin().read_to_string(&mut buffer).is_err() {
                eprintln!("sandbox-runner: no input provided");
                std::process::exit(2);
            }
            buffer
        }
    };

    let scaffold = match load_staged(Path::new(SCAFFOLD_DIR)) {
        Ok(scaffold) => Arc::new(scaffold),
        Err(e) => {
            eprintln!("sandbox-runner: {e}");
            std::process::exit(2);
        }
    };

    let outcome = run(scaffold, &input, log_level).await;
    if !outcome.is_success() {
        std::process::exit(1);
    }
}
