// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    error::StatsError,
    structs::{ExtremaPolicy, StatsSnapshot},
};
use std::collections::VecDeque;

/// Running extrema, either exact over the window or monotonic over history.
#[derive(Debug)]
enum Extrema {
    Window {
        minq: VecDeque<(f64, u64)>, // monotonic increasing (value, index)
        maxq: VecDeque<(f64, u64)>, // monotonic decreasing (value, index)
    },
    History {
        min: f64,
        max: f64,
    },
}

impl Extrema {
    fn new(policy: ExtremaPolicy) -> Self {
        match policy {
            ExtremaPolicy::Window => Extrema::Window {
                minq: VecDeque::new(),
                maxq: VecDeque::new(),
            },
            ExtremaPolicy::History => Extrema::History {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
        }
    }

    /// Absorb value `val` admitted as the `idx`th sample of a window of `cap` slots.
    fn absorb(&mut self, val: f64, idx: u64, cap: usize) {
        match self {
            Extrema::History { min, max } => {
                *min = min.min(val);
                *max = max.max(val);
            }
            Extrema::Window { minq, maxq } => {
                // Drop aged-out heads *before* adding new
                let cutoff: u64 = idx.saturating_sub(cap as u64 - 1);
                while minq.front().is_some_and(|&(_, i)| i < cutoff) {
                    minq.pop_front();
                }
                while maxq.front().is_some_and(|&(_, i)| i < cutoff) {
                    maxq.pop_front();
                }

                // Update min deque (pop larger tails)
                while minq.back().is_some_and(|&(v, _)| v > val) {
                    minq.pop_back();
                }
                minq.push_back((val, idx));

                // Update max deque (pop smaller tails)
                while maxq.back().is_some_and(|&(v, _)| v < val) {
                    maxq.pop_back();
                }
                maxq.push_back((val, idx));
            }
        }
    }

    fn min(&self) -> Option<f64> {
        match self {
            Extrema::Window { minq, .. } => minq.front().map(|(v, _)| *v),
            Extrema::History { min, .. } => min.is_finite().then_some(*min),
        }
    }

    fn max(&self) -> Option<f64> {
        match self {
            Extrema::Window { maxq, .. } => maxq.front().map(|(v, _)| *v),
            Extrema::History { max, .. } => max.is_finite().then_some(*max),
        }
    }
}

/// O(1) amortized running statistics over the last `cap` admitted prices.
///
/// The ring buffer grows on demand up to `cap` slots and is overwritten in
/// place afterwards. Variance is tracked as a running sum of squared
/// deviations (`m2`), updated from sum-derived means on growth and on
/// replacement of the evicted slot.
#[derive(Debug)]
pub struct RunningWindow {
    cap: usize,
    buf: Vec<f64>, // ring buffer of values, len() == populated slots
    head: u64,     // count of values ever admitted
    sum: f64,      // running sum
    m2: f64,       // running sum of squared deviations from the mean
    extrema: Extrema,
}

impl RunningWindow {
    /// Create new RunningWindow with capacity `cap` (clamped to 1 minimum).
    pub fn new(cap: usize, policy: ExtremaPolicy) -> Self {
        Self {
            cap: cap.max(1),
            buf: Vec::new(),
            head: 0,
            sum: 0.0,
            m2: 0.0,
            extrema: Extrema::new(policy),
        }
    }

    /// Admit a new value, evicting the oldest one if the window is full.
    ///
    /// Fails without touching the window if `val` is not finite, or if the
    /// running sum or the running squared deviations would stop being finite.
    pub fn admit(&mut self, val: f64) -> Result<(), StatsError> {
        if !val.is_finite() {
            return Err(StatsError::InvalidValue(val));
        }

        let slot: usize = (self.head % self.cap as u64) as usize;
        let full: bool = self.buf.len() == self.cap;
        let len: usize = self.buf.len();
        let mean_old: f64 = self.mean();

        let evicted: Option<f64> = full.then(|| self.buf[slot]);
        let sum: f64 = self.sum + val;
        if !sum.is_finite() {
            return Err(self.overflow(val, "sum"));
        }
        let sum: f64 = evicted.map_or(sum, |old: f64| sum - old);

        let new_len: usize = if full { len } else { len + 1 };
        let mean_new: f64 = sum / new_len as f64;
        let m2: f64 = match evicted {
            Some(old) => self.m2 + (val - old) * (val - mean_new + old - mean_old),
            None => self.m2 + (val - mean_old) * (val - mean_new),
        };
        if !m2.is_finite() {
            return Err(self.overflow(val, "squared deviations"));
        }

        // Commit
        if full {
            self.buf[slot] = val;
        } else {
            self.buf.push(val);
        }
        self.sum = sum;
        self.m2 = m2;
        self.extrema.absorb(val, self.head, self.cap);
        self.head += 1;
        Ok(())
    }

    #[inline]
    fn overflow(&self, value: f64, aggregate: &'static str) -> StatsError {
        StatsError::Overflow {
            value,
            capacity: self.cap,
            aggregate,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of populated slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Count of values ever admitted.
    pub fn admitted(&self) -> u64 {
        self.head
    }

    /// Latest admitted value, 0 when empty.
    pub fn last(&self) -> f64 {
        match self.head {
            0 => 0.0,
            h => self.buf[((h - 1) % self.cap as u64) as usize],
        }
    }

    /// Arithmetic mean of the window, 0 when empty.
    pub fn mean(&self) -> f64 {
        match self.len() {
            0 => 0.0,
            n => self.sum / n as f64,
        }
    }

    /// Population variance [M2 / N] of the window, 0 when empty.
    pub fn variance(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let var: f64 = self.m2 / self.len() as f64;
        match var {
            v if !v.is_finite() => f64::MAX,
            v if v < 0.0 => 0.0, // cancellation after evictions
            v => v,
        }
    }

    pub fn minimum(&self) -> f64 {
        self.extrema.min().unwrap_or_default()
    }

    pub fn maximum(&self) -> f64 {
        self.extrema.max().unwrap_or_default()
    }

    /// All five statistics at once. Callers hold the window lock around this.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            min: self.minimum(),
            max: self.maximum(),
            last: self.last(),
            avg: self.mean(),
            var: self.variance(),
        }
    }
}
