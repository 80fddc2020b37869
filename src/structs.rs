// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// How a window reports its minimum and maximum once it has wrapped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExtremaPolicy {
    /// Exact extrema over the values currently in the window
    #[default]
    Window,
    /// Extrema over every value the window has ever admitted
    History,
}

impl Display for ExtremaPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtremaPolicy::Window => write!(f, "window"),
            ExtremaPolicy::History => write!(f, "history"),
        }
    }
}

/// Point-in-time statistics of one window. All zeros for an empty window.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct StatsSnapshot {
    pub min: f64,
    pub max: f64,
    pub last: f64,
    pub avg: f64,
    pub var: f64,
}

/// Body of `POST /add_batch`. Absent fields and `null` values are rejected
/// by the registry rather than by the deserializer.
#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct AddBatchRequest {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub values: Option<Vec<Option<f64>>>,
}

/// Query string of `GET /stats`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatsQuery {
    #[serde(default)]
    pub symbol: Option<String>,
    pub k: i64,
}
