// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Registry mapping resolved metric names to their live metrics.

use crate::metrics::{Meter, Timer};
use metron_core::{MetricSnapshot, RateWindow};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// A live registry entry: exactly one of the two metric kinds.
///
/// The set of kinds is closed. An entry keeps its kind for its whole
/// lifetime; clears reset it in place.
#[derive(Debug)]
pub enum MetricEntry {
    /// An occurrence meter.
    Meter(Meter),
    /// A value-distribution timer.
    Timer(Timer),
}

impl MetricEntry {
    /// Occurrences recorded since creation or the last clear.
    pub fn count(&self) -> u64 {
        match self {
            Self::Meter(m) => m.count(),
            Self::Timer(t) => t.count(),
        }
    }

    /// Advances the entry's rate estimators by one tick.
    pub fn decay_tick(&mut self, tick_secs: f64) {
        match self {
            Self::Meter(m) => m.decay_tick(tick_secs),
            Self::Timer(t) => t.decay_tick(tick_secs),
        }
    }

    /// Takes a point-in-time snapshot of the entry.
    pub fn snapshot(&self, percentiles: &[u32]) -> MetricSnapshot {
        match self {
            Self::Meter(m) => MetricSnapshot::Meter(m.snapshot()),
            Self::Timer(t) => MetricSnapshot::Timer(t.snapshot(percentiles)),
        }
    }

    /// Resets the entry to its just-created state.
    pub fn clear(&mut self) {
        match self {
            Self::Meter(m) => m.clear(),
            Self::Timer(t) => t.clear(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Meter(_) => "meter",
            Self::Timer(_) => "timer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Meter,
    Timer,
}

/// Thread-safe mapping from resolved metric name to its entry.
///
/// Entries are created lazily on first observation and persist across
/// flushes; a clear resets them in place so previously seen names keep
/// reporting from zero. The map sits behind an `RwLock` and each entry
/// behind its own `Mutex`, so concurrent recording never observes a
/// partially applied update and the scheduler's tick reads consistent
/// snapshots.
#[derive(Debug)]
pub struct MetricRegistry {
    entries: RwLock<HashMap<String, Arc<Mutex<MetricEntry>>>>,
    windows: Vec<RateWindow>,
    percentiles: Vec<u32>,
    reservoir_size: usize,
}

impl MetricRegistry {
    /// Creates an empty registry building metrics with the given windows,
    /// percentiles, and reservoir capacity.
    pub fn new(windows: Vec<RateWindow>, percentiles: Vec<u32>, reservoir_size: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            windows,
            percentiles,
            reservoir_size,
        }
    }

    /// Records one occurrence on the named meter, creating it if absent.
    pub fn record_meter(&self, name: &str) {
        if let Some(entry) = self.get_or_create(name, Kind::Meter) {
            if let Ok(mut entry) = entry.lock() {
                if let MetricEntry::Meter(meter) = &mut *entry {
                    meter.record(1);
                }
            }
        }
    }

    /// Records one value on the named timer, creating it if absent.
    pub fn record_timer(&self, name: &str, value: f64) {
        if let Some(entry) = self.get_or_create(name, Kind::Timer) {
            if let Ok(mut entry) = entry.lock() {
                if let MetricEntry::Timer(timer) = &mut *entry {
                    timer.record(value);
                }
            }
        }
    }

    /// Looks up or lazily creates the entry for `name`.
    ///
    /// A name already held by the other kind skips the observation; the
    /// registry is the single source of truth and a name is never both.
    fn get_or_create(&self, name: &str, kind: Kind) -> Option<Arc<Mutex<MetricEntry>>> {
        let existing = match self.entries.read() {
            Ok(entries) => entries.get(name).cloned(),
            Err(_) => return None,
        };

        let entry = match existing {
            Some(entry) => entry,
            None => match self.entries.write() {
                Ok(mut entries) => entries
                    .entry(name.to_string())
                    .or_insert_with(|| {
                        log::trace!("[MetricRegistry] creating {} {:?}", kind_name(kind), name);
                        Arc::new(Mutex::new(self.build_entry(kind)))
                    })
                    .clone(),
                Err(_) => return None,
            },
        };

        let matches = match entry.lock() {
            Ok(guard) => guard.kind() == kind_name(kind),
            Err(_) => false,
        };
        if matches {
            Some(entry)
        } else {
            log::warn!(
                "[MetricRegistry] {:?} is already registered with a different kind, dropping {} observation",
                name,
                kind_name(kind)
            );
            None
        }
    }

    fn build_entry(&self, kind: Kind) -> MetricEntry {
        match kind {
            Kind::Meter => MetricEntry::Meter(Meter::new(&self.windows)),
            Kind::Timer => MetricEntry::Timer(Timer::new(&self.windows, self.reservoir_size)),
        }
    }

    /// Advances every entry's rate estimators by one tick.
    pub fn decay_all(&self, tick_secs: f64) {
        if let Ok(entries) = self.entries.read() {
            for entry in entries.values() {
                if let Ok(mut entry) = entry.lock() {
                    entry.decay_tick(tick_secs);
                }
            }
        }
    }

    /// Snapshots every entry that has recorded at least one occurrence,
    /// sorted by metric name for deterministic output.
    pub fn snapshots(&self) -> Vec<(String, MetricSnapshot)> {
        let mut out = Vec::new();
        if let Ok(entries) = self.entries.read() {
            for (name, entry) in entries.iter() {
                if let Ok(entry) = entry.lock() {
                    if entry.count() > 0 {
                        out.push((name.clone(), entry.snapshot(&self.percentiles)));
                    }
                }
            }
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Resets every entry in place; names stay registered.
    pub fn clear_all(&self) {
        if let Ok(entries) = self.entries.read() {
            for entry in entries.values() {
                if let Ok(mut entry) = entry.lock() {
                    entry.clear();
                }
            }
        }
    }

    /// Returns the number of registered metric names.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns `true` if no metric has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn kind_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Meter => "meter",
        Kind::Timer => "timer",
    }
}
