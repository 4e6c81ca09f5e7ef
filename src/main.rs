// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use std::env;

use layered_translator::config::consts::DEFAULT_LOG_DIRECTIVE;
use layered_translator::config::load_and_validate_config;
use layered_translator::loopback::LoopbackHarness;
use layered_translator::observability::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing(DEFAULT_LOG_DIRECTIVE);

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <config1.yaml> [config2.yaml ...]", args[0]);
        eprintln!("Example: {} configs/loopback.yaml configs/loopback-polled.yaml", args[0]);
        std::process::exit(1);
    }

    let mut failed = Vec::new();
    for config_file in &args[1..] {
        let config = load_and_validate_config(config_file)
            .with_context(|| format!("Failed to load {}", config_file))?;

        let report = LoopbackHarness::new(config)
            .run()
            .await
            .with_context(|| format!("Loopback failed for {}", config_file))?;

        println!("{}", serde_json::to_string_pretty(&report)?);
        if !report.matched() {
            failed.push(config_file.as_str());
        }
    }

    if !failed.is_empty() {
        bail!("Round trip mismatch in: {}", failed.join(", "));
    }
    Ok(())
}
