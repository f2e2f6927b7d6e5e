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

//! Value distribution tracking on top of a meter.

use crate::metrics::meter::Meter;
use metron_core::{RateWindow, TimerSnapshot};

/// Bounded uniform sample store for percentile estimation.
///
/// Holds every value until capacity, then switches to Algorithm R
/// replacement so the retained set stays representative of the whole
/// stream. With at most `capacity` recorded values the percentiles are
/// exact.
#[derive(Debug, Clone)]
struct Reservoir {
    samples: Vec<f64>,
    capacity: usize,
    seen: u64,
    rng_state: u64,
}

impl Reservoir {
    fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::new(),
            capacity,
            seen: 0,
            rng_state: 0x9E37_79B9_7F4A_7C15,
        }
    }

    /// xorshift64 step; cheap and good enough for replacement indices.
    fn next_random(&mut self) -> u64 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state = x;
        x
    }

    fn offer(&mut self, value: f64) {
        self.seen += 1;
        if self.samples.len() < self.capacity {
            self.samples.push(value);
        } else {
            let j = self.next_random() % self.seen;
            if (j as usize) < self.capacity {
                self.samples[j as usize] = value;
            }
        }
    }

    fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.samples.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    fn clear(&mut self) {
        self.samples.clear();
        self.seen = 0;
    }
}

/// A timer metric: occurrence meter plus min/max/mean/spread accumulators
/// and a sample reservoir for percentiles.
#[derive(Debug, Clone)]
pub struct Timer {
    meter: Meter,
    min: Option<f64>,
    max: Option<f64>,
    sum: f64,
    sum_squares: f64,
    reservoir: Reservoir,
}

impl Timer {
    /// Creates a timer tracking rates over the given windows and keeping
    /// at most `reservoir_size` samples.
    pub fn new(windows: &[RateWindow], reservoir_size: usize) -> Self {
        Self {
            meter: Meter::new(windows),
            min: None,
            max: None,
            sum: 0.0,
            sum_squares: 0.0,
            reservoir: Reservoir::new(reservoir_size),
        }
    }

    /// Records one measured value.
    ///
    /// Non-finite values are skipped; the ingestion layer reports them.
    pub fn record(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.sum += value;
        self.sum_squares += value * value;
        self.reservoir.offer(value);
        self.meter.record(1);
    }

    /// Advances the embedded meter's rate estimators by one tick.
    pub fn decay_tick(&mut self, tick_secs: f64) {
        self.meter.decay_tick(tick_secs);
    }

    /// Returns the number of recorded values since creation or last clear.
    pub fn count(&self) -> u64 {
        self.meter.count()
    }

    /// Returns the smallest recorded value, if any.
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Returns the largest recorded value, if any.
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Returns the arithmetic mean of all recorded values, zero when empty.
    pub fn mean(&self) -> f64 {
        let n = self.count();
        if n == 0 {
            0.0
        } else {
            self.sum / n as f64
        }
    }

    /// Sample variance from the running accumulators.
    ///
    /// Rounding can push the numerator slightly negative when all values
    /// are equal; clamp to zero so the square root stays defined.
    fn variance(&self) -> f64 {
        let n = self.count() as f64;
        if n < 2.0 {
            0.0
        } else {
            ((self.sum_squares - self.sum * self.sum / n) / (n - 1.0)).max(0.0)
        }
    }

    /// Takes a point-in-time snapshot including the requested percentiles.
    ///
    /// Only meaningful once at least one value has been recorded; the
    /// registry never snapshots an empty timer. The reported `stddev`
    /// field is the square root of the sample standard deviation.
    pub fn snapshot(&self, percentiles: &[u32]) -> TimerSnapshot {
        let sorted = self.reservoir.sorted();
        TimerSnapshot {
            meter: self.meter.snapshot(),
            min: self.min.unwrap_or(0.0),
            max: self.max.unwrap_or(0.0),
            mean: self.mean(),
            stddev: self.variance().sqrt().sqrt(),
            percentiles: percentiles
                .iter()
                .map(|&p| (p, percentile(&sorted, p)))
                .collect(),
        }
    }

    /// Resets the timer to its just-created state, keeping its windows and
    /// reservoir capacity.
    pub fn clear(&mut self) {
        self.meter.clear();
        self.min = None;
        self.max = None;
        self.sum = 0.0;
        self.sum_squares = 0.0;
        self.reservoir.clear();
    }
}

/// Percentile of a sorted sample set.
///
/// Uses the rank `pos = (p / 100) * (n + 1)`: positions before the first
/// sample clamp to it, positions at or past the last sample clamp to that,
/// and interior positions interpolate linearly between the two neighboring
/// samples. Monotonic non-decreasing in `p`.
fn percentile(sorted: &[f64], p: u32) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let n = sorted.len();
    let pos = (f64::from(p) / 100.0) * (n as f64 + 1.0);
    if pos < 1.0 {
        sorted[0]
    } else if pos >= n as f64 {
        sorted[n - 1]
    } else {
        let rank = pos.floor() as usize;
        let lower = sorted[rank - 1];
        let upper = sorted[rank];
        lower + (pos - pos.floor()) * (upper - lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const WINDOWS: [RateWindow; 3] = [
        RateWindow::OneMinute,
        RateWindow::FiveMinutes,
        RateWindow::FifteenMinutes,
    ];

    fn timer_with(values: &[f64]) -> Timer {
        let mut timer = Timer::new(&WINDOWS, 1028);
        for &v in values {
            timer.record(v);
        }
        timer
    }

    #[test]
    fn test_distribution_summary() {
        let timer = timer_with(&[10.0, 20.0, 30.0]);
        let snapshot = timer.snapshot(&[1, 99]);

        assert_eq!(snapshot.meter.count, 3);
        assert_relative_eq!(snapshot.min, 10.0);
        assert_relative_eq!(snapshot.max, 30.0);
        assert_relative_eq!(snapshot.mean, 20.0);
        assert_relative_eq!(snapshot.stddev, 10.0_f64.sqrt());
        assert_relative_eq!(snapshot.percentiles[0].1, 10.0);
        assert_relative_eq!(snapshot.percentiles[1].1, 30.0);
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [10.0, 20.0, 30.0];
        assert_relative_eq!(percentile(&sorted, 50), 20.0);
        assert_relative_eq!(percentile(&sorted, 60), 24.0, epsilon = 1e-9);
        assert_relative_eq!(percentile(&sorted, 75), 30.0);
        assert_relative_eq!(percentile(&sorted, 1), 10.0);
    }

    #[test]
    fn test_percentiles_are_monotonic() {
        let timer = timer_with(&[5.0, 1.0, 9.0, 2.0, 7.0, 3.0, 8.0, 4.0, 6.0]);
        let all: Vec<u32> = (1..=100).collect();
        let snapshot = timer.snapshot(&all);

        for pair in snapshot.percentiles.windows(2) {
            assert!(
                pair[1].1 >= pair[0].1,
                "p{} = {} fell below p{} = {}",
                pair[1].0,
                pair[1].1,
                pair[0].0,
                pair[0].1
            );
        }
    }

    #[test]
    fn test_single_sample_pins_every_percentile() {
        let timer = timer_with(&[42.0]);
        let snapshot = timer.snapshot(&[1, 50, 99]);
        for &(_, value) in &snapshot.percentiles {
            assert_relative_eq!(value, 42.0);
        }
    }

    #[test]
    fn test_identical_values_have_zero_spread() {
        let timer = timer_with(&[4.0; 16]);
        let snapshot = timer.snapshot(&[50]);
        assert_relative_eq!(snapshot.stddev, 0.0);
        assert_relative_eq!(snapshot.min, snapshot.max);
    }

    #[test]
    fn test_reservoir_is_bounded_but_count_is_not() {
        let mut timer = Timer::new(&WINDOWS, 8);
        for i in 0..1000 {
            timer.record(f64::from(i));
        }

        assert_eq!(timer.count(), 1000);
        assert_eq!(timer.reservoir.samples.len(), 8);
        // Retained samples all come from the stream.
        for &s in &timer.reservoir.samples {
            assert!((0.0..1000.0).contains(&s));
        }
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        let mut timer = timer_with(&[10.0]);
        timer.record(f64::NAN);
        timer.record(f64::INFINITY);

        assert_eq!(timer.count(), 1);
        assert_relative_eq!(timer.max().unwrap(), 10.0);
    }

    #[test]
    fn test_clear_resets_distribution() {
        let mut timer = timer_with(&[10.0, 20.0]);
        timer.clear();

        assert_eq!(timer.count(), 0);
        assert!(timer.min().is_none());
        assert!(timer.max().is_none());
        assert_relative_eq!(timer.mean(), 0.0);
        assert!(timer.reservoir.samples.is_empty());
    }
}
