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

//! Point-in-time snapshot values emitted on flush.

use serde::Serialize;
use serde_json::{Map, Value};

/// Snapshot of a meter: occurrence count plus one rate per configured window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterSnapshot {
    /// Occurrences recorded since creation or the last clear.
    pub count: u64,
    /// Decayed per-second rates, labeled per window.
    pub rates: Vec<(&'static str, f64)>,
}

impl MeterSnapshot {
    /// Renders the snapshot as output record fields.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("count".to_string(), Value::from(self.count));
        for &(label, rate) in &self.rates {
            fields.insert(label.to_string(), Value::from(rate));
        }
        fields
    }
}

/// Snapshot of a timer: meter figures plus the value distribution summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    /// Count and rates of the embedded meter.
    pub meter: MeterSnapshot,
    /// Smallest recorded value.
    pub min: f64,
    /// Largest recorded value.
    pub max: f64,
    /// Arithmetic mean of all recorded values.
    pub mean: f64,
    /// Reported spread figure; see the timer documentation for its derivation.
    pub stddev: f64,
    /// Requested percentiles as `(percentile, value)` pairs.
    pub percentiles: Vec<(u32, f64)>,
}

impl TimerSnapshot {
    /// Renders the snapshot as output record fields.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = self.meter.to_fields();
        fields.insert("min".to_string(), Value::from(self.min));
        fields.insert("max".to_string(), Value::from(self.max));
        fields.insert("mean".to_string(), Value::from(self.mean));
        fields.insert("stddev".to_string(), Value::from(self.stddev));
        for &(p, value) in &self.percentiles {
            fields.insert(format!("p{p}"), Value::from(value));
        }
        fields
    }
}

/// Snapshot of either metric kind.
///
/// The set of kinds is closed; every registry entry snapshots into exactly
/// one of these variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MetricSnapshot {
    /// A meter snapshot.
    Meter(MeterSnapshot),
    /// A timer snapshot.
    Timer(TimerSnapshot),
}

impl MetricSnapshot {
    /// Returns the occurrence count behind the snapshot.
    pub fn count(&self) -> u64 {
        match self {
            Self::Meter(m) => m.count,
            Self::Timer(t) => t.meter.count,
        }
    }

    /// Renders the snapshot as output record fields.
    pub fn to_fields(&self) -> Map<String, Value> {
        match self {
            Self::Meter(m) => m.to_fields(),
            Self::Timer(t) => t.to_fields(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_fields() {
        let snapshot = MeterSnapshot {
            count: 3,
            rates: vec![("rate_1m", 0.6), ("rate_5m", 0.6)],
        };
        let fields = snapshot.to_fields();

        assert_eq!(fields.get("count"), Some(&Value::from(3u64)));
        assert_eq!(fields.get("rate_1m"), Some(&Value::from(0.6)));
        assert_eq!(fields.get("rate_5m"), Some(&Value::from(0.6)));
        assert!(!fields.contains_key("rate_15m"));
    }

    #[test]
    fn test_timer_fields_include_distribution() {
        let snapshot = TimerSnapshot {
            meter: MeterSnapshot {
                count: 3,
                rates: vec![("rate_1m", 0.6)],
            },
            min: 10.0,
            max: 30.0,
            mean: 20.0,
            stddev: 10.0_f64.sqrt(),
            percentiles: vec![(1, 10.0), (99, 30.0)],
        };
        let fields = snapshot.to_fields();

        assert_eq!(fields.get("min"), Some(&Value::from(10.0)));
        assert_eq!(fields.get("max"), Some(&Value::from(30.0)));
        assert_eq!(fields.get("mean"), Some(&Value::from(20.0)));
        assert_eq!(fields.get("p1"), Some(&Value::from(10.0)));
        assert_eq!(fields.get("p99"), Some(&Value::from(30.0)));
        assert!(fields.contains_key("stddev"));
        assert!(fields.contains_key("count"));
    }

    #[test]
    fn test_snapshot_count_passthrough() {
        let meter = MetricSnapshot::Meter(MeterSnapshot {
            count: 7,
            rates: Vec::new(),
        });
        assert_eq!(meter.count(), 7);
    }
}
