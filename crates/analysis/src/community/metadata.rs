//! Per-sample metadata with derived metric columns.

use std::collections::HashMap;

/// Sample metadata: ids, optional temperature, pass-through text columns and
/// numeric metric columns.
///
/// Undefined metric values are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleMetadata {
    id_header: String,
    samples: Vec<String>,
    index: HashMap<String, usize>,
    temperature: Vec<Option<f64>>,
    /// Columns carried through unchanged, in input order
    passthrough: Vec<(String, Vec<String>)>,
    /// Numeric metric columns, in insertion order
    metrics: Vec<(String, Vec<Option<f64>>)>,
}

impl SampleMetadata {
    pub fn new() -> Self {
        Self {
            id_header: "Sample".to_string(),
            ..Self::default()
        }
    }

    pub fn with_id_header(mut self, header: impl Into<String>) -> Self {
        self.id_header = header.into();
        self
    }

    pub fn id_header(&self) -> &str {
        &self.id_header
    }

    /// Add a sample; returns `false` if the id is already present.
    pub fn push_sample(&mut self, id: impl Into<String>, temperature: Option<f64>) -> bool {
        let id = id.into();
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id.clone(), self.samples.len());
        self.samples.push(id);
        self.temperature.push(temperature);
        for (_, values) in &mut self.passthrough {
            values.push(String::new());
        }
        for (_, values) in &mut self.metrics {
            values.push(None);
        }
        true
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn contains(&self, sample: &str) -> bool {
        self.index.contains_key(sample)
    }

    pub fn temperature(&self, sample: &str) -> Option<f64> {
        self.index.get(sample).and_then(|&i| self.temperature[i])
    }

    pub fn has_temperature(&self) -> bool {
        self.temperature.iter().any(Option::is_some)
    }

    pub fn set_temperature(&mut self, sample: &str, temperature: Option<f64>) {
        if let Some(&i) = self.index.get(sample) {
            self.temperature[i] = temperature;
        }
    }

    /// Set a pass-through text value, creating the column if needed.
    pub fn set_text(&mut self, sample: &str, column: &str, value: impl Into<String>) {
        let Some(&i) = self.index.get(sample) else {
            return;
        };
        let n = self.samples.len();
        let pos = match self.passthrough.iter().position(|(name, _)| name == column) {
            Some(pos) => pos,
            None => {
                self.passthrough
                    .push((column.to_string(), vec![String::new(); n]));
                self.passthrough.len() - 1
            }
        };
        self.passthrough[pos].1[i] = value.into();
    }

    pub fn text(&self, sample: &str, column: &str) -> Option<&str> {
        let &i = self.index.get(sample)?;
        self.passthrough
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, values)| values[i].as_str())
    }

    pub fn passthrough_columns(&self) -> impl Iterator<Item = &str> {
        self.passthrough.iter().map(|(name, _)| name.as_str())
    }

    /// Create a metric column filled with `None` if it does not exist yet.
    pub fn ensure_metric_column(&mut self, column: &str) {
        if !self.metrics.iter().any(|(name, _)| name == column) {
            self.metrics
                .push((column.to_string(), vec![None; self.samples.len()]));
        }
    }

    /// Set a metric value, creating the column if needed. Unknown samples
    /// are ignored.
    pub fn set_metric(&mut self, sample: &str, column: &str, value: Option<f64>) {
        let Some(&i) = self.index.get(sample) else {
            return;
        };
        self.ensure_metric_column(column);
        if let Some((_, values)) = self.metrics.iter_mut().find(|(name, _)| name == column) {
            values[i] = value;
        }
    }

    pub fn metric(&self, sample: &str, column: &str) -> Option<f64> {
        let &i = self.index.get(sample)?;
        self.metrics
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, values)| values[i])
    }

    pub fn metric_columns(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_metric_column(&self, column: &str) -> bool {
        self.metrics.iter().any(|(name, _)| name == column)
    }
}
