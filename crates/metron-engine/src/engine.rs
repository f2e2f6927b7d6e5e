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

//! The aggregation engine: observation ingestion and tick handling.

use crate::registry::MetricRegistry;
use crate::scheduler::FlushScheduler;
use metron_core::{Event, FieldTemplate, MetricsConfig, MetricsResult};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug)]
struct CompiledMeter {
    name: FieldTemplate,
}

#[derive(Debug)]
struct CompiledTimer {
    name: FieldTemplate,
    value: FieldTemplate,
}

/// The composition root: owns one registry and one scheduler.
///
/// `observe` may be called concurrently from any number of worker
/// threads; `tick` is expected from a single scheduling thread on the
/// injected cadence. Instances are fully independent of each other, so
/// several engines can run side by side without coordination.
///
/// ```
/// use metron_core::{Event, MeterDef, MetricsConfig};
/// use metron_engine::MetricsEngine;
///
/// let engine = MetricsEngine::new(MetricsConfig {
///     meters: vec![MeterDef::new("http_%{response}")],
///     ..Default::default()
/// })
/// .unwrap();
///
/// engine.observe(&Event::new().with_field("response", 200));
/// let output = engine.tick().unwrap();
/// assert!(output[0].get("http_200").is_some());
/// ```
#[derive(Debug)]
pub struct MetricsEngine {
    meters: Vec<CompiledMeter>,
    timers: Vec<CompiledTimer>,
    registry: MetricRegistry,
    scheduler: Mutex<FlushScheduler>,
    ignore_older_than: Option<Duration>,
    split_metrics: bool,
}

impl MetricsEngine {
    /// Builds an engine from a configuration.
    ///
    /// Validation happens here, before any observation is accepted; any
    /// invalid value is fatal and no engine is constructed.
    pub fn new(config: MetricsConfig) -> MetricsResult<Self> {
        config.validate()?;
        let windows = config.rate_windows()?;
        let percentiles = config.percentile_set()?;

        let meters = config
            .meters
            .iter()
            .map(|def| {
                Ok(CompiledMeter {
                    name: FieldTemplate::parse(&def.name)?,
                })
            })
            .collect::<MetricsResult<Vec<_>>>()?;
        let timers = config
            .timers
            .iter()
            .map(|def| {
                Ok(CompiledTimer {
                    name: FieldTemplate::parse(&def.name)?,
                    value: FieldTemplate::parse(&def.value)?,
                })
            })
            .collect::<MetricsResult<Vec<_>>>()?;

        Ok(Self {
            meters,
            timers,
            registry: MetricRegistry::new(windows, percentiles, config.reservoir_size),
            scheduler: Mutex::new(FlushScheduler::new(
                config.tick_interval_secs,
                config.flush_interval_secs,
                config.clear_interval_secs,
            )),
            ignore_older_than: config.ignore_older_than_secs.map(Duration::from_secs),
            split_metrics: config.split_metrics,
        })
    }

    /// Feeds one observation record through every metric definition.
    ///
    /// Never fails: definitions whose templates do not resolve against
    /// this record are skipped, as are timer values that do not parse as
    /// finite numbers.
    pub fn observe(&self, event: &Event) {
        if let Some(max_age) = self.ignore_older_than {
            if event.age() > max_age {
                log::debug!(
                    "[MetricsEngine] skipping record older than {}s",
                    max_age.as_secs()
                );
                return;
            }
        }

        for def in &self.meters {
            match def.name.resolve(event) {
                Some(name) => self.registry.record_meter(&name),
                None => log::trace!(
                    "[MetricsEngine] meter pattern {:?} unresolved, skipping",
                    def.name.pattern()
                ),
            }
        }

        for def in &self.timers {
            let Some(name) = def.name.resolve(event) else {
                log::trace!(
                    "[MetricsEngine] timer pattern {:?} unresolved, skipping",
                    def.name.pattern()
                );
                continue;
            };
            let Some(raw) = def.value.resolve(event) else {
                log::trace!(
                    "[MetricsEngine] value pattern {:?} unresolved, skipping {}",
                    def.value.pattern(),
                    name
                );
                continue;
            };
            match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => self.registry.record_timer(&name, value),
                _ => log::debug!(
                    "[MetricsEngine] dropping non-numeric value {:?} for timer {}",
                    raw,
                    name
                ),
            }
        }
    }

    /// Advances the engine by one scheduling beat.
    ///
    /// Every tick decays all rate estimators. On a flush boundary the
    /// engine emits a snapshot of every metric that recorded anything:
    /// one combined record, or one record per metric in split mode.
    /// Returns `None` when there is nothing to emit this tick, which is
    /// distinct from an empty output list; a flush boundary with no
    /// non-empty metric emits nothing. A clear boundary resets all metric
    /// state after the flush of the same tick, so the flushed values are
    /// the ones that were reported.
    pub fn tick(&self) -> Option<Vec<Event>> {
        let (decision, tick_secs) = {
            let mut scheduler = match self.scheduler.lock() {
                Ok(scheduler) => scheduler,
                Err(_) => return None,
            };
            (scheduler.on_tick(), scheduler.tick_secs())
        };

        self.registry.decay_all(tick_secs);

        let output = if decision.flush { self.flush() } else { None };

        if decision.clear {
            log::debug!("[MetricsEngine] clearing all metric state");
            self.registry.clear_all();
        }

        output
    }

    fn flush(&self) -> Option<Vec<Event>> {
        let snapshots = self.registry.snapshots();
        if snapshots.is_empty() {
            return None;
        }

        if self.split_metrics {
            Some(
                snapshots
                    .into_iter()
                    .map(|(name, snapshot)| {
                        let mut event = Event::new();
                        event.set(name, snapshot.to_fields());
                        event
                    })
                    .collect(),
            )
        } else {
            let mut event = Event::new();
            for (name, snapshot) in snapshots {
                event.set(name, snapshot.to_fields());
            }
            Some(vec![event])
        }
    }

    /// Returns the engine's metric registry.
    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }
}
