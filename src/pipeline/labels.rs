//! Ordered class label sets.

/// Labels indexed by a model's output classes.
///
/// Models may emit more classes than there are known labels; such indices get
/// a synthetic `class_<i>` name instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Creates a label set from labels in output-index order.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// The known label at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// The label at `index`, or `class_<index>` past the end of the set.
    pub fn label(&self, index: usize) -> String {
        self.get(index)
            .map(str::to_string)
            .unwrap_or_else(|| format!("class_{index}"))
    }

    /// Number of known labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the set has no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates over the known labels in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for LabelSet {
    fn from(labels: Vec<String>) -> Self {
        Self { labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_synthetic_labels() {
        let labels = LabelSet::new(["acne", "normal"]);
        assert_eq!(labels.label(0), "acne");
        assert_eq!(labels.label(1), "normal");
        assert_eq!(labels.label(2), "class_2");
        assert_eq!(labels.get(7), None);
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_empty_set_names_everything() {
        let labels = LabelSet::default();
        assert!(labels.is_empty());
        assert_eq!(labels.label(0), "class_0");
    }
}
