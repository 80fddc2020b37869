// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{registry::DEFAULT_MAX_BATCH, structs::ExtremaPolicy};
use clap::{Parser, crate_authors, crate_description, crate_name, crate_version, value_parser};
use std::net::SocketAddr;

/// Configuration struct for the program.
#[derive(Parser, Debug, Clone)]
#[command(
    name = crate_name!(),
    version = crate_version!(),
    author = crate_authors!(),
    about = crate_description!()
)]
pub(crate) struct PwConfig {
    #[arg(
        long,
        short = 'l',
        value_name = "ADDR",
        required = false,
        default_value = "127.0.0.1:8080",
        help = "Address to serve the HTTP API on"
    )]
    pub listen: SocketAddr,

    #[arg(
        long,
        short = 'b',
        value_name = "NUM",
        required = false,
        value_parser = value_parser!(u32).range(1..=1_000_000),
        default_value_t = DEFAULT_MAX_BATCH as u32,
        help = "Maximum number of values accepted in a single batch"
    )]
    pub max_batch: u32,

    #[arg(
        long,
        short = 'e',
        value_name = "POLICY",
        required = false,
        value_enum,
        default_value_t = ExtremaPolicy::Window,
        help = "Min/max over current window contents, or over all values ever admitted"
    )]
    pub extrema: ExtremaPolicy,

    #[arg(long, short = 'S', help = "Print per-symbol statistics on shutdown")]
    pub summary: bool,

    #[arg(long, short = 'v', help = "Increase output verbosity")]
    pub verbose: bool,

    #[arg(long, help = "Print debug information where applicable")]
    pub debug: bool,
}

impl PwConfig {
    /// Parses command line arguments and returns a [PwConfig] struct.
    pub fn parse() -> PwConfig {
        <PwConfig as Parser>::parse()
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        match (self.debug, self.verbose) {
            (true, _) => "trace",
            (false, true) => "debug",
            _ => "info",
        }
    }
}
