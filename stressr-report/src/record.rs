use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Key under which the raw report HTML is embedded when requested.
pub const REPORT_HTML_KEY: &str = "report_html";

/// Canonical keys that never make it into a [`StatisticsRecord`].
pub const EXCLUDED_KEYS: [&str; 2] = ["AverageSize", "p100"];

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// Coerces a data cell to a number, keeping the raw text when that fails.
    ///
    /// Uses Rust float syntax: digit separators such as `1_000` are not
    /// accepted and stay text.
    #[must_use]
    pub fn from_cell(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(v) => Self::Number(v),
            Err(_) => Self::Text(raw.to_string()),
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Normalized statistics of one load test run.
///
/// Metrics keep the column order of the report. A key seen twice keeps its
/// first position and takes the later value. Serializes as a flat map with
/// `report_html` last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsRecord {
    metrics: Vec<(String, MetricValue)>,
    report_html: Option<String>,
}

impl StatisticsRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a metric. Excluded and reserved keys are dropped; returns
    /// whether the metric was stored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetricValue>) -> bool {
        let key = key.into();
        if EXCLUDED_KEYS.contains(&key.as_str()) || key == REPORT_HTML_KEY {
            return false;
        }

        let value = value.into();
        match self.metrics.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.metrics.push((key, value)),
        }
        true
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.metrics.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of metrics, not counting an embedded report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn report_html(&self) -> Option<&str> {
        self.report_html.as_deref()
    }

    #[must_use]
    pub fn with_report_html(mut self, html: impl Into<String>) -> Self {
        self.report_html = Some(html.into());
        self
    }

    pub fn take_report_html(&mut self) -> Option<String> {
        self.report_html.take()
    }
}

impl Serialize for StatisticsRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = self.metrics.len() + usize::from(self.report_html.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (k, v) in &self.metrics {
            map.serialize_entry(k, v)?;
        }
        if let Some(html) = &self.report_html {
            map.serialize_entry(REPORT_HTML_KEY, html)?;
        }
        map.end()
    }
}
