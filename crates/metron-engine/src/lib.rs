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

//! # Metron Engine
//!
//! Streaming metrics aggregation: meters and timers with decaying rates,
//! a lazily populated registry, and a tick-driven flush/clear scheduler.
//!
//! The host pipeline feeds records through [`MetricsEngine::observe`] and
//! drives [`MetricsEngine::tick`] on a fixed cadence; flush boundaries
//! emit point-in-time snapshot records built from the
//! [`metron_core`] contracts.

#![warn(missing_docs)]

pub mod engine;
pub mod metrics;
pub mod registry;
pub mod scheduler;

pub use engine::MetricsEngine;
pub use metrics::{Ewma, Meter, Timer};
pub use registry::{MetricEntry, MetricRegistry};
pub use scheduler::{FlushScheduler, TickDecision};
