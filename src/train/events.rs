//! Epoch-start notifications
//!
//! Observers (loggers, loss trackers, curriculum hooks) register listener
//! callbacks; the epoch scheduler fires them synchronously in registration
//! order once per `advance_epoch`, after reseeding, repacking and shuffling.
//! Fire-and-forget: no return value is consumed.

/// Payload of an epoch-start notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochInfo {
    /// The epoch that is starting (1-based once training runs)
    pub epoch_num: u32,
    /// Sentence count for the upcoming epoch; may change between epochs when
    /// data regeneration is active
    pub num_sents: usize,
}

/// Trait for epoch-start observers
pub trait EpochListener: Send {
    /// Called once at the start of every epoch
    fn on_new_epoch(&mut self, info: &EpochInfo);
}

/// Holds registered listeners and dispatches notifications in order.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Box<dyn EpochListener>>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; invocation order is registration order
    pub fn register<L: EpochListener + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener));
    }

    /// Register an already-boxed listener
    pub fn register_boxed(&mut self, listener: Box<dyn EpochListener>) {
        self.listeners.push(listener);
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Fire an epoch-start notification to every listener
    pub fn fire(&mut self, info: &EpochInfo) {
        for listener in &mut self.listeners {
            listener.on_new_epoch(info);
        }
    }
}

/// Listener that prints one line per epoch start.
#[derive(Debug, Clone, Default)]
pub struct LogListener {
    name: Option<String>,
}

impl LogListener {
    /// Create a listener, optionally prefixing lines with a task name
    pub fn new(name: Option<String>) -> Self {
        Self { name }
    }
}

impl EpochListener for LogListener {
    fn on_new_epoch(&mut self, info: &EpochInfo) {
        match &self.name {
            Some(name) => println!(
                "[{}] Epoch {} starting ({} sentences)",
                name, info.epoch_num, info.num_sents
            ),
            None => println!(
                "Epoch {} starting ({} sentences)",
                info.epoch_num, info.num_sents
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recorder {
        id: usize,
        log: Arc<Mutex<Vec<(usize, u32)>>>,
    }

    impl EpochListener for Recorder {
        fn on_new_epoch(&mut self, info: &EpochInfo) {
            self.log.lock().unwrap().push((self.id, info.epoch_num));
        }
    }

    #[test]
    fn test_fire_reaches_all_listeners_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        for id in 0..3 {
            registry.register(Recorder {
                id,
                log: log.clone(),
            });
        }

        registry.fire(&EpochInfo {
            epoch_num: 1,
            num_sents: 100,
        });

        assert_eq!(*log.lock().unwrap(), vec![(0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_empty_registry_fires_nothing() {
        let mut registry = ListenerRegistry::new();
        assert!(registry.is_empty());
        registry.fire(&EpochInfo {
            epoch_num: 1,
            num_sents: 0,
        });
    }

    #[test]
    fn test_repeated_fire() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.register(Recorder {
            id: 0,
            log: log.clone(),
        });

        for epoch in 1..=3 {
            registry.fire(&EpochInfo {
                epoch_num: epoch,
                num_sents: 10,
            });
        }

        assert_eq!(log.lock().unwrap().len(), 3);
    }
}
