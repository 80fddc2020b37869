// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    args::PwConfig,
    error::StatsError,
    runwin::RunningWindow,
    structs::{ExtremaPolicy, StatsSnapshot},
};
use itertools::Itertools;
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

/// Window capacities for size-indices 1..=8.
pub(crate) const SIZE_CLASSES: [usize; 8] =
    [10, 100, 1_000, 10_000, 50_000, 100_000, 200_000, 500_000];
pub(crate) const MIN_K: i64 = 1;
pub(crate) const MAX_K: i64 = SIZE_CLASSES.len() as i64;
pub(crate) const DEFAULT_MAX_BATCH: usize = 10_000;

/// The eight size-class windows of one symbol, each behind its own lock.
#[derive(Debug)]
pub(crate) struct SymbolWindows {
    slots: [RwLock<RunningWindow>; SIZE_CLASSES.len()],
}

impl SymbolWindows {
    fn new(policy: ExtremaPolicy) -> Self {
        Self {
            slots: SIZE_CLASSES.map(|cap| RwLock::new(RunningWindow::new(cap, policy))),
        }
    }

    /// Admit `val` to every window in size-index order.
    fn admit(&self, val: f64) -> Result<(), StatsError> {
        for slot in &self.slots {
            slot.write().admit(val)?;
        }
        Ok(())
    }

    /// Snapshot of window `idx` (0-based). The read lock covers all five stats.
    fn snapshot(&self, idx: usize) -> StatsSnapshot {
        self.slots[idx].read().snapshot()
    }

    /// Count of values admitted to the largest window.
    fn admitted(&self) -> u64 {
        self.slots[SIZE_CLASSES.len() - 1].read().admitted()
    }
}

/// Maps a trimmed symbol to its [SymbolWindows]. Symbols are never evicted.
#[derive(Debug)]
pub(crate) struct SymbolRegistry {
    windows: RwLock<HashMap<String, Arc<SymbolWindows>>>,
    policy: ExtremaPolicy,
    max_batch: usize,
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new(ExtremaPolicy::default(), DEFAULT_MAX_BATCH)
    }
}

impl SymbolRegistry {
    pub fn new(policy: ExtremaPolicy, max_batch: usize) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            policy,
            max_batch: max_batch.max(1),
        }
    }

    pub fn from_config(conf: &PwConfig) -> Self {
        Self::new(conf.extrema, conf.max_batch as usize)
    }

    pub fn policy(&self) -> ExtremaPolicy {
        self.policy
    }

    pub fn max_batch(&self) -> usize {
        self.max_batch
    }

    /// Number of known symbols.
    pub fn len(&self) -> usize {
        self.windows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All known symbols, sorted.
    pub fn symbols(&self) -> Vec<String> {
        self.windows.read().keys().cloned().sorted().collect()
    }

    fn lookup(&self, symbol: &str) -> Option<Arc<SymbolWindows>> {
        self.windows.read().get(symbol).cloned()
    }

    /// Find the windows for `symbol`, inserting them on first sight.
    /// Only the writer holding the map lock constructs, so at most one
    /// [SymbolWindows] ever exists per symbol.
    fn lookup_or_insert(&self, symbol: &str) -> Arc<SymbolWindows> {
        if let Some(found) = self.lookup(symbol) {
            return found;
        }
        let mut map = self.windows.write();
        map.entry(symbol.to_string())
            .or_insert_with(|| Arc::new(SymbolWindows::new(self.policy)))
            .clone()
    }

    /// Admit `values` in order to all eight windows of `symbol`.
    ///
    /// The batch is validated as a whole before anything is admitted. An
    /// [StatsError::Overflow] stops the batch midway and leaves the values
    /// admitted so far in place.
    pub fn ingest(&self, symbol: &str, values: &[f64]) -> Result<(), StatsError> {
        let symbol: &str = valid_symbol(symbol)?;
        self.check_batch(values.len())?;
        if let Some(pos) = values.iter().position(|v: &f64| !v.is_finite()) {
            return Err(StatsError::invalid(format!(
                "value at index {pos} is not finite: {}",
                values[pos]
            )));
        }

        let tuple: Arc<SymbolWindows> = self.lookup_or_insert(symbol);
        for &val in values {
            tuple.admit(val)?;
        }
        Ok(())
    }

    /// Like [SymbolRegistry::ingest], for batches whose entries may be absent.
    pub fn ingest_opt(&self, symbol: &str, values: &[Option<f64>]) -> Result<(), StatsError> {
        self.check_batch(values.len())?;
        let values: Vec<f64> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.ok_or_else(|| StatsError::invalid(format!("value at index {i} is missing")))
            })
            .collect::<Result<_, _>>()?;
        self.ingest(symbol, &values)
    }

    fn check_batch(&self, len: usize) -> Result<(), StatsError> {
        match len {
            0 => Err(StatsError::invalid("values cannot be empty")),
            n if n > self.max_batch => Err(StatsError::invalid(format!(
                "batch of {n} values exceeds the limit of {}",
                self.max_batch
            ))),
            _ => Ok(()),
        }
    }

    /// Snapshot window `k` (1..=8) of `symbol`. Unknown symbols read as zeros.
    pub fn query(&self, symbol: &str, k: i64) -> Result<StatsSnapshot, StatsError> {
        if !(MIN_K..=MAX_K).contains(&k) {
            return Err(StatsError::invalid(format!(
                "k must be between {MIN_K} and {MAX_K}, got {k}"
            )));
        }
        let symbol: &str = valid_symbol(symbol)?;
        Ok(self
            .lookup(symbol)
            .map(|t: Arc<SymbolWindows>| t.snapshot((k - 1) as usize))
            .unwrap_or_default())
    }

    /// Per-symbol rows of (symbol, values admitted, size-class 1 snapshot), sorted by symbol.
    pub fn summary(&self) -> Vec<(String, u64, StatsSnapshot)> {
        let tuples: Vec<(String, Arc<SymbolWindows>)> = self
            .windows
            .read()
            .iter()
            .map(|(s, t)| (s.clone(), t.clone()))
            .collect();
        // snapshots are taken after releasing the map lock
        tuples
            .into_iter()
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .map(|(s, t)| {
                let admitted: u64 = t.admitted();
                (s, admitted, t.snapshot(0))
            })
            .collect()
    }
}

/// Trim `symbol`, rejecting it if nothing remains.
fn valid_symbol(symbol: &str) -> Result<&str, StatsError> {
    match symbol.trim() {
        "" => Err(StatsError::invalid("symbol cannot be empty")),
        s => Ok(s),
    }
}
