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

//! # Metron Core
//!
//! Foundational crate containing the record type, field templates,
//! configuration, and snapshot contracts shared across the metron
//! workspace.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod event;
pub mod snapshot;
pub mod template;

pub use config::{MeterDef, MetricsConfig, RateWindow, TimerDef};
pub use error::{ConfigError, MetricsResult};
pub use event::Event;
pub use snapshot::{MeterSnapshot, MetricSnapshot, TimerSnapshot};
pub use template::FieldTemplate;
