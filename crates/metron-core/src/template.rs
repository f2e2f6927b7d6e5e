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

//! Name patterns resolved against an event's fields.
//!
//! A pattern like `http_%{response}` mixes literal text with `%{field}`
//! references. Templates are parsed once at configuration time; resolution
//! against a concrete event is a cheap string build.

use crate::error::{ConfigError, MetricsResult};
use crate::event::Event;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A pre-parsed field interpolation pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl FieldTemplate {
    /// Parses a pattern string into a template.
    ///
    /// Fails if a `%{` reference is unterminated or names no field.
    pub fn parse(pattern: &str) -> MetricsResult<Self> {
        let mut segments = Vec::new();
        let mut rest = pattern;

        while let Some(start) = rest.find("%{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after
                .find('}')
                .ok_or_else(|| ConfigError::UnterminatedReference(pattern.to_string()))?;
            let name = &after[..end];
            if name.is_empty() {
                return Err(ConfigError::EmptyReference(pattern.to_string()));
            }
            segments.push(Segment::Field(name.to_string()));
            rest = &after[end + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// Returns the original pattern text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns `true` if the template references no fields.
    pub fn is_literal(&self) -> bool {
        !self
            .segments
            .iter()
            .any(|s| matches!(s, Segment::Field(_)))
    }

    /// Resolves the template against an event.
    ///
    /// Returns `None` when any referenced field is absent or is not a
    /// scalar value. Resolution never fails hard; an unresolved template
    /// simply skips the observation it was driving.
    pub fn resolve(&self, event: &Event) -> Option<String> {
        let mut out = String::with_capacity(self.pattern.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => {
                    let value = event.get(name)?;
                    out.push_str(&render_scalar(value)?);
                }
            }
        }
        Some(out)
    }
}

/// Renders a scalar JSON value the way it appears in a metric name.
///
/// Strings pass through unquoted; numbers and booleans use their display
/// form. Structured values do not belong in a name and yield `None`.
fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_and_reference_mix() {
        let template = FieldTemplate::parse("http_%{response}").unwrap();
        let event = Event::new().with_field("response", 200);

        assert_eq!(template.resolve(&event), Some("http_200".to_string()));
        assert!(!template.is_literal());
    }

    #[test]
    fn test_multiple_references() {
        let template = FieldTemplate::parse("%{method}_%{response}_total").unwrap();
        let event = Event::new()
            .with_field("method", "GET")
            .with_field("response", 404);

        assert_eq!(template.resolve(&event), Some("GET_404_total".to_string()));
    }

    #[test]
    fn test_pure_literal_resolves_to_itself() {
        let template = FieldTemplate::parse("http_request_time").unwrap();
        assert!(template.is_literal());
        assert_eq!(
            template.resolve(&Event::new()),
            Some("http_request_time".to_string())
        );
    }

    #[test]
    fn test_missing_field_is_unresolved() {
        let template = FieldTemplate::parse("http_%{response}").unwrap();
        let event = Event::new().with_field("path", "/");
        assert_eq!(template.resolve(&event), None);
    }

    #[test]
    fn test_structured_value_is_unresolved() {
        let template = FieldTemplate::parse("%{tags}").unwrap();
        let event = Event::new().with_field("tags", serde_json::json!(["a", "b"]));
        assert_eq!(template.resolve(&event), None);
    }

    #[test]
    fn test_scalar_rendering() {
        let template = FieldTemplate::parse("%{a}-%{b}-%{c}").unwrap();
        let event = Event::new()
            .with_field("a", "x")
            .with_field("b", 2.5)
            .with_field("c", true);

        assert_eq!(template.resolve(&event), Some("x-2.5-true".to_string()));
    }

    #[test]
    fn test_unterminated_reference_is_rejected() {
        let err = FieldTemplate::parse("http_%{response").unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnterminatedReference("http_%{response".to_string())
        );
    }

    #[test]
    fn test_empty_reference_is_rejected() {
        let err = FieldTemplate::parse("http_%{}").unwrap_err();
        assert_eq!(err, ConfigError::EmptyReference("http_%{}".to_string()));
    }
}
