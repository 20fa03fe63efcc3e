//! Line format builder.
//!
//! One metric per line, shaped as
//! `category,source=<source>,method=<tag> field=value`.
//! Lines keep insertion order; the backend does not care about ordering but
//! dashboards group more predictably when categories arrive in a fixed sequence.

use std::fmt;

use crate::error::{LineFluxError, Result};

/// Field value. Stringified as-is, except percentages which keep at most two
/// decimal places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Percent(f64),
}

impl FieldValue {
    pub fn percent(v: f64) -> Self {
        FieldValue::Percent(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::UInt(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Percent(v) => write!(f, "{}", (v * 100.0).round() / 100.0),
        }
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UInt(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

/// A single formatted metric. Built fresh every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLine {
    pub category: String,
    pub source: String,
    pub method_tag: String,
    pub field: String,
    pub value: FieldValue,
}

impl fmt::Display for MetricLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},source={},method={} {}={}",
            self.category, self.source, self.method_tag, self.field, self.value
        )
    }
}

/// Ordered collection of lines sharing one source tag.
#[derive(Debug, Clone)]
pub struct Batch {
    source: String,
    lines: Vec<MetricLine>,
}

impl Batch {
    /// Create an empty batch for the given process source tag.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            lines: Vec::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Append one line. Names are checked against the format's delimiters;
    /// values are not.
    pub fn add_line(
        &mut self,
        category: &str,
        method_tag: &str,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<()> {
        check_name("category", category)?;
        check_name("source", &self.source)?;
        check_name("method tag", method_tag)?;
        check_name("field", field)?;

        self.lines.push(MetricLine {
            category: category.to_string(),
            source: self.source.clone(),
            method_tag: method_tag.to_string(),
            field: field.to_string(),
            value: value.into(),
        });
        Ok(())
    }

    /// Join all lines with `separator`, in insertion order.
    pub fn render(&self, separator: &str) -> String {
        self.lines
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }

    pub fn lines(&self) -> &[MetricLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<MetricLine> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Reject names the backend would split on.
pub fn check_name(what: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LineFluxError::Build(format!("{what} must not be empty")));
    }
    if let Some(c) = name.chars().find(|c| matches!(c, ' ' | ',' | '=' | '\n' | '\r')) {
        return Err(LineFluxError::Build(format!(
            "{what} {name:?} contains reserved character {c:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn percent_keeps_two_decimals() {
        assert_eq!(FieldValue::percent(42.16666).to_string(), "42.17");
        assert_eq!(FieldValue::percent(37.0).to_string(), "37");
        assert_eq!(FieldValue::percent(250.0).to_string(), "250");
    }

    #[test]
    fn floats_use_shortest_form() {
        assert_eq!(FieldValue::from(12.5).to_string(), "12.5");
        assert_eq!(FieldValue::from(0.0).to_string(), "0");
        assert_eq!(FieldValue::from(-3_i64).to_string(), "-3");
    }

    #[test]
    fn rejects_delimiters_in_names() {
        let mut b = Batch::new("svc");
        let err = b.add_line("request", "GET /x", "total", 1_u64).unwrap_err();
        assert_eq!(err.kind().as_str(), "BUILD_FAILURE");
        assert!(b.is_empty());
    }
}
