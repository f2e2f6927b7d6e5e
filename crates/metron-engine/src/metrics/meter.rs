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

//! Occurrence counting with decaying rates.

use crate::metrics::ewma::Ewma;
use metron_core::{MeterSnapshot, RateWindow};

/// A monotonic occurrence counter plus one rate estimator per configured
/// window.
///
/// The count only ever grows between clears; rates decay on every tick.
#[derive(Debug, Clone)]
pub struct Meter {
    count: u64,
    trackers: Vec<Ewma>,
}

impl Meter {
    /// Creates a meter tracking rates over the given windows.
    ///
    /// Windows not listed here never produce a rate field.
    pub fn new(windows: &[RateWindow]) -> Self {
        Self {
            count: 0,
            trackers: windows.iter().map(|&w| Ewma::new(w)).collect(),
        }
    }

    /// Records `n` occurrences.
    pub fn record(&mut self, n: u64) {
        self.count += n;
        for tracker in &mut self.trackers {
            tracker.record(n);
        }
    }

    /// Advances every rate estimator by one tick.
    pub fn decay_tick(&mut self, tick_secs: f64) {
        for tracker in &mut self.trackers {
            tracker.decay_tick(tick_secs);
        }
    }

    /// Returns the occurrence count since creation or the last clear.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Takes a point-in-time snapshot of count and rates.
    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            count: self.count,
            rates: self
                .trackers
                .iter()
                .map(|t| (t.window().label(), t.rate()))
                .collect(),
        }
    }

    /// Resets the meter to its just-created state, keeping its windows.
    pub fn clear(&mut self) {
        self.count = 0;
        for tracker in &mut self.trackers {
            tracker.reset();
        }
    }
}
