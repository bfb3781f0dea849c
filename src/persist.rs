//! Model parameter persistence
//!
//! The weight serialization format is external; the training loop only needs
//! three operations, all keyed by the configured model file path the store
//! was built with: bootstrap-load, persist-best and revert-to-best.

use crate::error::Result;
use std::path::Path;

/// Interface to the model's parameter storage.
pub trait ParamStore: Send {
    /// Load parameters from a file (pretrained-model bootstrap)
    fn load(&mut self, path: &Path) -> Result<()>;

    /// Persist the current parameters as the best checkpoint
    fn save_best(&mut self) -> Result<()>;

    /// Roll parameters back to the best saved checkpoint
    fn revert_to_best(&mut self) -> Result<()>;
}
