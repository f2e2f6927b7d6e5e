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

//! The observation record consumed and produced by the engine.

use serde::Serialize;
use serde_json::{Map, Value};
use std::time::{Duration, SystemTime};

/// A single observation record: a set of named fields plus a timestamp.
///
/// The engine only relies on the narrow "get/set named field" capability;
/// field values are JSON scalars or structures. Flush output is delivered
/// as events of the same shape, with one field per metric name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    fields: Map<String, Value>,
    timestamp: SystemTime,
}

impl Event {
    /// Creates an empty event stamped with the current time.
    pub fn new() -> Self {
        Self {
            fields: Map::new(),
            timestamp: SystemTime::now(),
        }
    }

    /// Builder-style field insertion, convenient for tests and demos.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Removes a field, returning its previous value if it existed.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Returns `true` if the event carries a field with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the number of fields on the event.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the event carries no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the event's fields.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Returns the event's timestamp.
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Overrides the event's timestamp.
    ///
    /// Records normally keep their creation time; ingestion layers that
    /// carry an upstream timestamp can restamp the event before handing it
    /// to the engine.
    pub fn set_timestamp(&mut self, timestamp: SystemTime) {
        self.timestamp = timestamp;
    }

    /// Returns how long ago the event was stamped.
    ///
    /// Events stamped in the future report an age of zero.
    pub fn age(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.timestamp)
            .unwrap_or_default()
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_roundtrip() {
        let mut event = Event::new();
        event.set("response", 200);
        event.set("path", "/index.html");

        assert_eq!(event.get("response"), Some(&Value::from(200)));
        assert_eq!(event.get("path"), Some(&Value::from("/index.html")));
        assert!(event.get("missing").is_none());
        assert_eq!(event.len(), 2);
    }

    #[test]
    fn test_remove_and_contains() {
        let mut event = Event::new().with_field("status", "ok");
        assert!(event.contains("status"));

        let removed = event.remove("status");
        assert_eq!(removed, Some(Value::from("ok")));
        assert!(!event.contains("status"));
        assert!(event.is_empty());
    }

    #[test]
    fn test_age_of_backdated_event() {
        let mut event = Event::new();
        event.set_timestamp(SystemTime::now() - Duration::from_secs(120));
        assert!(event.age() >= Duration::from_secs(120));
    }

    #[test]
    fn test_future_timestamp_has_zero_age() {
        let mut event = Event::new();
        event.set_timestamp(SystemTime::now() + Duration::from_secs(3600));
        assert_eq!(event.age(), Duration::ZERO);
    }
}
