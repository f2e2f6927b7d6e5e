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

//! Tick accounting for flush and clear boundaries.

/// What a single tick asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickDecision {
    /// Emit a snapshot of all non-empty metrics.
    pub flush: bool,
    /// Reset all metric state after any flush of the same tick.
    pub clear: bool,
}

/// Counts ticks against the flush and clear intervals.
///
/// The host calls `tick()` on a fixed cadence it injects at construction;
/// the scheduler itself never touches a clock, which keeps tests fully
/// deterministic. The two counters advance together but reset
/// independently.
#[derive(Debug, Clone)]
pub struct FlushScheduler {
    tick_interval_secs: u64,
    flush_interval_secs: u64,
    clear_interval_secs: Option<u64>,
    ticks_since_flush: u64,
    ticks_since_clear: u64,
}

impl FlushScheduler {
    /// Creates a scheduler for the given cadence and intervals.
    ///
    /// Intervals are validated upstream; all of them are positive here.
    pub fn new(
        tick_interval_secs: u64,
        flush_interval_secs: u64,
        clear_interval_secs: Option<u64>,
    ) -> Self {
        Self {
            tick_interval_secs,
            flush_interval_secs,
            clear_interval_secs,
            ticks_since_flush: 0,
            ticks_since_clear: 0,
        }
    }

    /// Returns the injected tick cadence in seconds, as a float for the
    /// decay math.
    pub fn tick_secs(&self) -> f64 {
        self.tick_interval_secs as f64
    }

    /// Advances both counters by one tick and reports what is due.
    ///
    /// A counter resets whenever its boundary is reached, whether or not
    /// the engine ends up emitting anything for it.
    pub fn on_tick(&mut self) -> TickDecision {
        self.ticks_since_flush += 1;
        self.ticks_since_clear += 1;

        let flush = self.ticks_since_flush * self.tick_interval_secs >= self.flush_interval_secs;
        if flush {
            self.ticks_since_flush = 0;
        }

        let clear = match self.clear_interval_secs {
            Some(interval) => {
                let due = self.ticks_since_clear * self.tick_interval_secs >= interval;
                if due {
                    self.ticks_since_clear = 0;
                }
                due
            }
            None => false,
        };

        TickDecision { flush, clear }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cadence_flushes_every_tick() {
        let mut scheduler = FlushScheduler::new(5, 5, None);
        for _ in 0..4 {
            let decision = scheduler.on_tick();
            assert!(decision.flush);
            assert!(!decision.clear);
        }
    }

    #[test]
    fn test_longer_flush_interval() {
        let mut scheduler = FlushScheduler::new(5, 15, None);
        let flushes: Vec<bool> = (0..9).map(|_| scheduler.on_tick().flush).collect();
        assert_eq!(
            flushes,
            vec![false, false, true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn test_clear_counter_is_independent() {
        let mut scheduler = FlushScheduler::new(5, 5, Some(15));
        let decisions: Vec<TickDecision> = (0..6).map(|_| scheduler.on_tick()).collect();

        assert!(decisions.iter().all(|d| d.flush));
        let clears: Vec<bool> = decisions.iter().map(|d| d.clear).collect();
        assert_eq!(clears, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn test_clear_disabled_by_default() {
        let mut scheduler = FlushScheduler::new(5, 5, None);
        assert!((0..100).all(|_| !scheduler.on_tick().clear));
    }

    #[test]
    fn test_non_divisible_intervals_round_up() {
        // 7s of elapsed time per two ticks against a 10s interval: the
        // boundary lands on the tick that crosses it, not between ticks.
        let mut scheduler = FlushScheduler::new(7, 10, None);
        let flushes: Vec<bool> = (0..4).map(|_| scheduler.on_tick().flush).collect();
        assert_eq!(flushes, vec![false, true, false, true]);
    }
}
