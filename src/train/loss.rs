//! Loss aggregation
//!
//! One forward pass may produce a single scalar or a named bundle of terms,
//! plus an optional auxiliary loss. `LossRecord` collects the named
//! breakdown for logging and exposes the combined total for the optimizer
//! step; it is built fresh per minibatch and never outlives the logging
//! window.

/// Name under which a plain scalar loss is recorded
pub const PRIMARY_LOSS_NAME: &str = "loss";

/// Name under which an auxiliary loss is recorded
pub const ADDITIONAL_LOSS_NAME: &str = "additional_loss";

/// Insertion-ordered mapping from loss-component name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LossRecord {
    components: Vec<(String, f32)>,
}

impl LossRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a named component, accumulating if the name already exists
    pub fn add(&mut self, name: impl Into<String>, value: f32) {
        let name = name.into();
        match self.components.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing += value,
            None => self.components.push((name, value)),
        }
    }

    /// Value of a named component, if recorded
    pub fn get(&self, name: &str) -> Option<f32> {
        self.components
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Combined total across all components
    pub fn total(&self) -> f32 {
        self.components.iter().map(|(_, v)| v).sum()
    }

    /// Named breakdown in insertion order
    pub fn components(&self) -> &[(String, f32)] {
        &self.components
    }

    /// Number of recorded components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Fold another record into this one, component by component
    pub fn accumulate(&mut self, other: &LossRecord) {
        for (name, value) in &other.components {
            self.add(name.clone(), *value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_component_total() {
        let mut record = LossRecord::new();
        record.add(PRIMARY_LOSS_NAME, 2.5);
        assert_relative_eq!(record.total(), 2.5);
        assert_eq!(record.get("loss"), Some(2.5));
    }

    #[test]
    fn test_bundle_sums_to_total() {
        let mut record = LossRecord::new();
        record.add("a", 2.0);
        record.add("b", 3.0);
        assert_relative_eq!(record.total(), 5.0);
        assert_eq!(
            record.components(),
            &[("a".to_string(), 2.0), ("b".to_string(), 3.0)]
        );
    }

    #[test]
    fn test_additional_loss_joins_total() {
        let mut record = LossRecord::new();
        record.add("a", 2.0);
        record.add("b", 3.0);
        record.add(ADDITIONAL_LOSS_NAME, 1.5);
        assert_relative_eq!(record.total(), 6.5);
        assert_eq!(record.get(ADDITIONAL_LOSS_NAME), Some(1.5));
    }

    #[test]
    fn test_same_name_accumulates() {
        let mut record = LossRecord::new();
        record.add("loss", 1.0);
        record.add("loss", 0.5);
        assert_eq!(record.len(), 1);
        assert_relative_eq!(record.total(), 1.5);
    }

    #[test]
    fn test_accumulate_across_minibatches() {
        let mut epoch = LossRecord::new();
        let mut step = LossRecord::new();
        step.add("loss", 1.0);
        epoch.accumulate(&step);
        epoch.accumulate(&step);
        assert_relative_eq!(epoch.total(), 2.0);
        assert_eq!(epoch.len(), 1);
    }
}
