//! Dev-set evaluation interface
//!
//! Metric computations live outside the crate; checkpoints only need a score
//! with a direction. The first score a checkpoint collects is the primary
//! metric used for schedule decisions, the rest are logged as auxiliary.

use crate::error::Result;
use std::fmt;

/// A dev-set evaluation result with a task-specific ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    metric: String,
    value: f64,
    higher_is_better: bool,
}

impl Score {
    /// Create a score with an explicit ordering
    pub fn new(metric: impl Into<String>, value: f64, higher_is_better: bool) -> Self {
        Self {
            metric: metric.into(),
            value,
            higher_is_better,
        }
    }

    /// A loss-style score: lower is better
    pub fn loss(value: f64) -> Self {
        Self::new("loss", value, false)
    }

    /// Metric name
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Score value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether larger values win
    pub fn higher_is_better(&self) -> bool {
        self.higher_is_better
    }

    /// True if this score beats `other` under this metric's ordering
    pub fn better_than(&self, other: &Score) -> bool {
        if self.higher_is_better {
            self.value > other.value
        } else {
            self.value < other.value
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:.4}", self.metric, self.value)
    }
}

/// A task run against held-out data at every dev checkpoint.
pub trait DevTask: Send {
    /// Evaluate and return one or more scores; a single score is a
    /// one-element vector
    fn eval(&mut self) -> Result<Vec<Score>>;

    /// Name used in log lines
    fn name(&self) -> &str {
        "dev"
    }
}
