//! Model interface
//!
//! The neural model's forward/backward computation and parameter storage are
//! external; the training loop drives them through `TranslationModel` and
//! never sees anything richer than loss scalars.

use crate::batch::Batch;
use crate::error::Result;

/// A loss coming back from the model's forward pass: either a single scalar
/// or a named bundle of component terms.
#[derive(Debug, Clone, PartialEq)]
pub enum LossValue {
    /// One undifferentiated loss term
    Scalar(f32),
    /// Named component terms, summed to form the trainable primary loss
    Bundle(Vec<(String, f32)>),
}

/// A loss value with its gradient path severed.
///
/// The training loop hands the model `Detached(-primary)` when asking for an
/// auxiliary loss; because only the bare value crosses the interface, nothing
/// the model computes from it can back-propagate into the primary loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detached(f32);

impl Detached {
    /// Wrap a value, severing it from any gradient path
    pub fn new(value: f32) -> Self {
        Self(value)
    }

    /// The detached value
    pub fn value(&self) -> f32 {
        self.0
    }
}

/// Strategy for turning model outputs into a training loss.
///
/// Opaque to the training loop; it is passed through to the model untouched.
pub trait LossCalculator: Send {
    /// Name of the loss calculation strategy
    fn name(&self) -> &str;
}

/// Maximum-likelihood loss, the default strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MleLoss;

impl LossCalculator for MleLoss {
    fn name(&self) -> &str {
        "mle"
    }
}

/// Interface the training task drives the model through.
pub trait TranslationModel: Send {
    /// Forward pass for one minibatch, returning the training loss
    fn calc_loss(
        &mut self,
        src: &Batch,
        trg: &Batch,
        loss_calculator: &dyn LossCalculator,
    ) -> Result<LossValue>;

    /// Optional auxiliary/regularization loss computed from the detached
    /// negative of the primary loss
    fn calc_additional_loss(&mut self, _detached: Detached) -> Option<f32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_carries_value() {
        let d = Detached::new(-1.5);
        assert_eq!(d.value(), -1.5);
    }

    #[test]
    fn test_mle_loss_name() {
        assert_eq!(MleLoss.name(), "mle");
    }
}
