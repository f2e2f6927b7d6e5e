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

//! Error types for engine configuration and setup.

use thiserror::Error;

/// A specialized `Result` type for configuration and setup operations.
pub type MetricsResult<T> = Result<T, ConfigError>;

/// An error raised while validating a [`MetricsConfig`](crate::config::MetricsConfig)
/// or compiling its templates.
///
/// Any of these is fatal at construction time. An engine is never handed out
/// with a partially valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A rate window outside the supported set was requested.
    #[error("invalid rate window: {0} minutes (supported windows are 1, 5 and 15)")]
    InvalidRate(u32),

    /// A percentile outside `[1, 100]` was requested.
    #[error("invalid percentile: {0} (must be between 1 and 100)")]
    InvalidPercentile(u32),

    /// An interval that must be positive was zero.
    #[error("{name} must be greater than zero")]
    ZeroInterval {
        /// The configuration key at fault.
        name: &'static str,
    },

    /// The timer sample reservoir cannot hold zero samples.
    #[error("reservoir_size must be greater than zero")]
    ZeroReservoir,

    /// A template contains a `%{` that is never closed.
    #[error("unterminated field reference in template {0:?}")]
    UnterminatedReference(String),

    /// A template contains an empty `%{}` reference.
    #[error("empty field reference in template {0:?}")]
    EmptyReference(String),

    /// Neither a meter nor a timer definition was supplied.
    #[error("at least one meter or timer must be configured")]
    NoMetrics,
}
