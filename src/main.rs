// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

mod args;
mod error;
mod registry;
mod routes;
mod runwin;
mod structs;
mod summary;
mod utils;

use crate::{
    args::PwConfig,
    registry::SymbolRegistry,
    routes::api_router,
    summary::{SUMMARY_HDRS, simple_tabulate, summary_rows},
    utils::{setup_signal_handler, shutdown_signal},
};

use std::sync::Arc;
use tokio::{net::TcpListener, sync::Notify};
use tracing_subscriber::EnvFilter;

////////////////////////////////////////////////////////////////////////////////

/// Initialise tracing. `RUST_LOG` wins over the command line verbosity flags.
fn setup_tracing(conf: &PwConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(conf.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Print the per-symbol shutdown table to stdout.
fn print_summary(registry: &SymbolRegistry) {
    let rows: Vec<Vec<String>> = summary_rows(&registry.summary());
    for line in simple_tabulate(&rows, Some(&SUMMARY_HDRS)) {
        println!("{line}");
    }
}

////////////////////////////////////////////////////////////////////////////////

#[tokio::main(worker_threads = 8)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let conf: Arc<PwConfig> = PwConfig::parse().into();
    setup_tracing(&conf);

    let registry: Arc<SymbolRegistry> = Arc::new(SymbolRegistry::from_config(&conf));
    tracing::debug!(
        "extrema policy: {}, batch limit: {}",
        registry.policy(),
        registry.max_batch()
    );

    let quit: Arc<Notify> = Arc::new(Notify::new());
    setup_signal_handler(quit.clone())?;

    let listener: TcpListener = TcpListener::bind(conf.listen).await?;
    tracing::info!(
        "{} v{} listening on http://{}",
        clap::crate_name!(),
        clap::crate_version!(),
        listener.local_addr()?
    );

    axum::serve(listener, api_router(registry.clone()))
        .with_graceful_shutdown(shutdown_signal(quit))
        .await?;
    tracing::info!("Server stopped, tracking {} symbols", registry.len());

    if conf.summary {
        print_summary(&registry);
    }
    Ok(())
}
