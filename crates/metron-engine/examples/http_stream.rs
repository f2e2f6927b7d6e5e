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

//! Feeds a synthetic HTTP record stream through the engine and prints
//! each flushed snapshot. Run with `RUST_LOG=debug` to see the engine's
//! diagnostics.

use metron_core::{Event, MeterDef, MetricsConfig, TimerDef};
use metron_engine::MetricsEngine;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let engine = MetricsEngine::new(MetricsConfig {
        meters: vec![MeterDef::new("http_%{response}")],
        timers: vec![TimerDef::new("request_time", "%{elapsed_ms}")],
        flush_interval_secs: 10,
        ..Default::default()
    })?;

    // Two scheduling beats worth of traffic; the host would drive tick()
    // from a real 5-second cadence instead.
    for round in 0..2u32 {
        for i in 0..12u32 {
            let status = if i % 5 == 0 { 500 } else { 200 };
            engine.observe(
                &Event::new()
                    .with_field("response", status)
                    .with_field("elapsed_ms", 8.0 + f64::from(i % 7) * 3.5),
            );
        }

        if let Some(output) = engine.tick() {
            println!("--- flush after round {round} ---");
            for event in &output {
                for (name, fields) in event.fields() {
                    println!("{name}: {}", serde_json::to_string_pretty(fields)?);
                }
            }
        } else {
            println!("--- no flush after round {round} ---");
        }
    }

    Ok(())
}
