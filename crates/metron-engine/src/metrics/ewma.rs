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

//! Exponentially-weighted moving-average rate estimation.

use metron_core::RateWindow;

/// A decaying per-second rate estimator for one window.
///
/// Occurrences accumulate in `uncounted` between ticks; each tick folds
/// them into the rate. The first tick seeds the rate with the observed
/// instantaneous rate, subsequent ticks apply the exponential decay
/// `rate += alpha * (instant - rate)` with
/// `alpha = 1 - exp(-tick_secs / window_secs)`.
#[derive(Debug, Clone)]
pub struct Ewma {
    window: RateWindow,
    rate: f64,
    uncounted: u64,
    primed: bool,
}

impl Ewma {
    /// Creates an estimator for the given decay window.
    pub fn new(window: RateWindow) -> Self {
        Self {
            window,
            rate: 0.0,
            uncounted: 0,
            primed: false,
        }
    }

    /// Returns the window this estimator decays over.
    pub fn window(&self) -> RateWindow {
        self.window
    }

    /// Adds occurrences to the pending tally.
    ///
    /// The rate itself only moves on [`decay_tick`](Self::decay_tick).
    pub fn record(&mut self, n: u64) {
        self.uncounted += n;
    }

    /// Folds the pending tally into the rate and starts a fresh tally.
    pub fn decay_tick(&mut self, tick_secs: f64) {
        let instant = self.uncounted as f64 / tick_secs;
        self.uncounted = 0;

        if self.primed {
            let alpha = 1.0 - (-tick_secs / self.window.window_secs()).exp();
            self.rate += alpha * (instant - self.rate);
        } else {
            self.rate = instant;
            self.primed = true;
        }
    }

    /// Returns the current decayed rate in events per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Resets the estimator to its just-created state.
    pub fn reset(&mut self) {
        self.rate = 0.0;
        self.uncounted = 0;
        self.primed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_tick_seeds_instant_rate() {
        let mut ewma = Ewma::new(RateWindow::OneMinute);
        ewma.record(3);

        assert_eq!(ewma.rate(), 0.0);
        ewma.decay_tick(5.0);
        assert_relative_eq!(ewma.rate(), 0.6);
    }

    #[test]
    fn test_idle_ticks_decay_toward_zero() {
        let mut ewma = Ewma::new(RateWindow::OneMinute);
        ewma.record(3);
        ewma.decay_tick(5.0);

        let alpha = 1.0 - (-5.0_f64 / 60.0).exp();
        ewma.decay_tick(5.0);
        assert_relative_eq!(ewma.rate(), 0.6 * (1.0 - alpha));

        for _ in 0..500 {
            ewma.decay_tick(5.0);
        }
        assert!(ewma.rate() < 1e-9);
    }

    #[test]
    fn test_uncounted_drains_exactly_once_per_tick() {
        let mut ewma = Ewma::new(RateWindow::OneMinute);
        ewma.record(10);
        ewma.decay_tick(5.0);
        let seeded = ewma.rate();

        // A second tick with no new occurrences must not re-count the 10.
        ewma.decay_tick(5.0);
        assert!(ewma.rate() < seeded);
    }

    #[test]
    fn test_longer_windows_decay_slower() {
        let mut short = Ewma::new(RateWindow::OneMinute);
        let mut long = Ewma::new(RateWindow::FifteenMinutes);
        for ewma in [&mut short, &mut long] {
            ewma.record(60);
            ewma.decay_tick(5.0);
            ewma.decay_tick(5.0);
        }
        assert!(short.rate() < long.rate());
    }

    #[test]
    fn test_reset_restores_unprimed_state() {
        let mut ewma = Ewma::new(RateWindow::FiveMinutes);
        ewma.record(5);
        ewma.decay_tick(5.0);
        ewma.reset();

        assert_eq!(ewma.rate(), 0.0);
        ewma.record(1);
        ewma.decay_tick(5.0);
        // Seeds again instead of decaying from the stale rate.
        assert_relative_eq!(ewma.rate(), 0.2);
    }
}
