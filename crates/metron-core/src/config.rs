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

//! Engine configuration and its validation rules.

use crate::error::{ConfigError, MetricsResult};
use serde::{Deserialize, Serialize};

/// Default capacity of a timer's sample reservoir.
pub const DEFAULT_RESERVOIR_SIZE: usize = 1028;

/// One of the supported rate decay windows.
///
/// The set of windows is closed; rates are always labeled after their
/// window (`rate_1m`, `rate_5m`, `rate_15m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateWindow {
    /// One-minute decay window.
    OneMinute,
    /// Five-minute decay window.
    FiveMinutes,
    /// Fifteen-minute decay window.
    FifteenMinutes,
}

impl RateWindow {
    /// Maps a window selector in minutes to a window, if supported.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        match minutes {
            1 => Some(Self::OneMinute),
            5 => Some(Self::FiveMinutes),
            15 => Some(Self::FifteenMinutes),
            _ => None,
        }
    }

    /// Returns the window length in minutes.
    pub fn minutes(self) -> u32 {
        match self {
            Self::OneMinute => 1,
            Self::FiveMinutes => 5,
            Self::FifteenMinutes => 15,
        }
    }

    /// Returns the window length in seconds, as used by the decay formula.
    pub fn window_secs(self) -> f64 {
        f64::from(self.minutes()) * 60.0
    }

    /// Returns the snapshot field label for this window.
    pub fn label(self) -> &'static str {
        match self {
            Self::OneMinute => "rate_1m",
            Self::FiveMinutes => "rate_5m",
            Self::FifteenMinutes => "rate_15m",
        }
    }
}

/// Declares one meter metric: a name pattern resolved per observed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterDef {
    /// Name pattern, e.g. `http_%{response}`.
    pub name: String,
}

impl MeterDef {
    /// Creates a meter definition from a name pattern.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Declares one timer metric: a name pattern plus a value pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDef {
    /// Name pattern, e.g. `http_request_time`.
    pub name: String,
    /// Value pattern resolved to the numeric sample, e.g. `%{request_time}`.
    pub value: String,
}

impl TimerDef {
    /// Creates a timer definition from a name pattern and a value pattern.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Full configuration surface of a metrics engine instance.
///
/// Validated once at engine construction; an invalid configuration is a
/// fatal error and the engine is never built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Meter definitions, one metric per resolved name.
    pub meters: Vec<MeterDef>,
    /// Timer definitions, one metric per resolved name.
    pub timers: Vec<TimerDef>,
    /// Rate window selectors in minutes; only 1, 5 and 15 are valid.
    pub rates: Vec<u32>,
    /// Percentiles to report for timers, each in `[1, 100]`.
    pub percentiles: Vec<u32>,
    /// Seconds between snapshot emissions.
    pub flush_interval_secs: u64,
    /// Seconds between full state resets; `None` never clears.
    pub clear_interval_secs: Option<u64>,
    /// Emit one output record per metric instead of one combined record.
    pub split_metrics: bool,
    /// Cadence at which the host calls `tick()`, in seconds.
    pub tick_interval_secs: u64,
    /// Skip records whose timestamp is older than this many seconds.
    pub ignore_older_than_secs: Option<u64>,
    /// Capacity of each timer's sample reservoir.
    pub reservoir_size: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            meters: Vec::new(),
            timers: Vec::new(),
            rates: vec![1, 5, 15],
            percentiles: vec![1, 5, 10, 90, 95, 99],
            flush_interval_secs: 5,
            clear_interval_secs: None,
            split_metrics: false,
            tick_interval_secs: 5,
            ignore_older_than_secs: None,
            reservoir_size: DEFAULT_RESERVOIR_SIZE,
        }
    }
}

impl MetricsConfig {
    /// Checks every configured value, failing on the first violation.
    pub fn validate(&self) -> MetricsResult<()> {
        if self.meters.is_empty() && self.timers.is_empty() {
            return Err(ConfigError::NoMetrics);
        }
        self.rate_windows()?;
        self.percentile_set()?;
        if self.flush_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "flush_interval_secs",
            });
        }
        if self.tick_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "tick_interval_secs",
            });
        }
        if self.clear_interval_secs == Some(0) {
            return Err(ConfigError::ZeroInterval {
                name: "clear_interval_secs",
            });
        }
        if self.reservoir_size == 0 {
            return Err(ConfigError::ZeroReservoir);
        }
        Ok(())
    }

    /// Resolves the rate selectors into windows, deduplicated in order.
    pub fn rate_windows(&self) -> MetricsResult<Vec<RateWindow>> {
        let mut windows = Vec::with_capacity(self.rates.len());
        for &minutes in &self.rates {
            let window =
                RateWindow::from_minutes(minutes).ok_or(ConfigError::InvalidRate(minutes))?;
            if !windows.contains(&window) {
                windows.push(window);
            }
        }
        Ok(windows)
    }

    /// Validates the percentile list, deduplicated in order.
    pub fn percentile_set(&self) -> MetricsResult<Vec<u32>> {
        let mut percentiles = Vec::with_capacity(self.percentiles.len());
        for &p in &self.percentiles {
            if !(1..=100).contains(&p) {
                return Err(ConfigError::InvalidPercentile(p));
            }
            if !percentiles.contains(&p) {
                percentiles.push(p);
            }
        }
        Ok(percentiles)
    }
}
