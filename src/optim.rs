//! Optimizer interface
//!
//! The update rule is external; the checkpoint policy only ever reads and
//! scales the learning rate, and restarts the optimizer's accumulators when
//! rolling weights back to the best checkpoint.

/// Narrow interface to the gradient-descent trainer.
pub trait Optimizer: Send {
    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);

    /// Clear internal accumulator state (momentum, Adam moments, ...)
    fn restart(&mut self);
}
