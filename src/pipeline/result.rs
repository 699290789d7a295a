//! Classification results as returned to the service boundary.

use super::labels::LabelSet;
use ndarray::ArrayView1;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Converts a probability in [0, 1] into a percentage rounded to 2 decimals.
///
/// Rounds on the binary value with halves away from zero, so a value sitting
/// exactly on a decimal half may differ in the last digit from a
/// decimal-exact rounding.
pub fn to_percentage(probability: f32) -> f64 {
    (f64::from(probability) * 100.0 * 100.0).round() / 100.0
}

/// Percentage per class, in output-index order.
///
/// Serializes as a JSON object whose keys keep the index order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassProbabilities {
    entries: Vec<(String, f64)>,
}

impl ClassProbabilities {
    /// Builds the map for one row of class probabilities.
    pub fn from_row(row: ArrayView1<'_, f32>, labels: &LabelSet) -> Self {
        let entries = row
            .iter()
            .enumerate()
            .map(|(index, &p)| (labels.label(index), to_percentage(p)))
            .collect();
        Self { entries }
    }

    /// Percentage for `label`, if present.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| *value)
    }

    /// Iterates over `(label, percentage)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no classes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Outcome of one classification request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Probability of the predicted class, in [0, 1].
    pub max_prob: f64,
    /// Label of the most probable class.
    pub predicted_class: String,
    /// Percentage for every output class.
    pub class_probabilities: ClassProbabilities,
    /// Stage from the stage model, or the default stage.
    pub predicted_stage: String,
}

/// Response body wrapping a result under `classification`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResponse {
    /// The wrapped result.
    pub classification: ClassificationResult,
}

impl From<ClassificationResult> for ClassificationResponse {
    fn from(classification: ClassificationResult) -> Self {
        Self { classification }
    }
}
