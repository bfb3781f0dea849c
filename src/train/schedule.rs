//! Patience-gated learning-rate decay and early stopping
//!
//! The two-tier patience rule: a distinct `initial_patience` lets the
//! schedule tolerate a longer warm-up before the first decay, while decaying
//! more eagerly (plain `patience`) thereafter. That asymmetry is load-bearing
//! and preserved exactly.

use super::state::TrainingState;
use crate::error::{Error, Result};

/// What a failed checkpoint implies for the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleAction {
    /// Patience not yet exhausted; keep training unchanged
    Wait,
    /// Multiply the learning rate by the decay factor
    Decay,
    /// Decay budget exhausted; stop training
    Stop,
}

/// Learning-schedule policy applied at dev checkpoints.
#[derive(Debug, Clone)]
pub struct LearningSchedule {
    lr_decay: f32,
    lr_decay_times: u32,
    patience: u32,
    initial_patience: Option<u32>,
    restart_trainer: bool,
}

impl LearningSchedule {
    /// Create a schedule.
    ///
    /// # Arguments
    ///
    /// * `lr_decay` - Learning-rate multiplier per decay, must satisfy
    ///   `0 < lr_decay <= 1`; exactly 1 disables the decay machinery
    /// * `lr_decay_times` - Early stopping after this many decays
    /// * `patience` - Non-improving checkpoints tolerated before a decay
    /// * `initial_patience` - If given, patience used before the first decay
    /// * `restart_trainer` - Restart the optimizer and revert weights to the
    ///   best checkpoint on every decay
    pub fn new(
        lr_decay: f32,
        lr_decay_times: u32,
        patience: u32,
        initial_patience: Option<u32>,
        restart_trainer: bool,
    ) -> Result<Self> {
        if lr_decay > 1.0 || lr_decay <= 0.0 {
            return Err(Error::Config(
                "illegal lr_decay, must satisfy: 0.0 < lr_decay <= 1.0".to_string(),
            ));
        }
        Ok(Self {
            lr_decay,
            lr_decay_times,
            patience,
            initial_patience,
            restart_trainer,
        })
    }

    /// The decay multiplier
    pub fn lr_decay(&self) -> f32 {
        self.lr_decay
    }

    /// Whether weights roll back to the best checkpoint on decay
    pub fn restart_trainer(&self) -> bool {
        self.restart_trainer
    }

    /// A factor of exactly 1.0 disables decay and early stopping
    pub fn decays_enabled(&self) -> bool {
        self.lr_decay < 1.0
    }

    fn should_decay(&self, state: &TrainingState) -> bool {
        let steady = (self.initial_patience.is_none() || state.num_times_lr_decayed > 0)
            && state.cur_attempt >= self.patience;
        let first = self
            .initial_patience
            .is_some_and(|ip| state.num_times_lr_decayed == 0 && state.cur_attempt >= ip);
        steady || first
    }

    /// Register a non-improving checkpoint and decide what follows.
    ///
    /// Increments `cur_attempt`; on an eligible decay also increments
    /// `num_times_lr_decayed`, returning `Stop` once that exceeds the budget.
    pub fn on_no_improvement(&self, state: &mut TrainingState) -> ScheduleAction {
        state.cur_attempt += 1;
        if !self.decays_enabled() || !self.should_decay(state) {
            return ScheduleAction::Wait;
        }
        state.num_times_lr_decayed += 1;
        if state.num_times_lr_decayed > self.lr_decay_times {
            ScheduleAction::Stop
        } else {
            ScheduleAction::Decay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(patience: u32, initial: Option<u32>) -> LearningSchedule {
        LearningSchedule::new(0.5, 3, patience, initial, false).unwrap()
    }

    #[test]
    fn test_rejects_decay_factor_out_of_range() {
        assert!(LearningSchedule::new(0.0, 3, 1, None, false).is_err());
        assert!(LearningSchedule::new(-0.5, 3, 1, None, false).is_err());
        assert!(LearningSchedule::new(1.5, 3, 1, None, false).is_err());
        assert!(LearningSchedule::new(1.0, 3, 1, None, false).is_ok());
        assert!(LearningSchedule::new(0.5, 3, 1, None, false).is_ok());
    }

    #[test]
    fn test_factor_of_one_disables_decay() {
        let schedule = LearningSchedule::new(1.0, 0, 1, None, false).unwrap();
        let mut state = TrainingState::new(1);
        for _ in 0..10 {
            assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Wait);
        }
        assert_eq!(state.num_times_lr_decayed, 0);
        assert_eq!(state.cur_attempt, 10);
    }

    #[test]
    fn test_decay_after_patience() {
        let schedule = schedule(2, None);
        let mut state = TrainingState::new(1);

        assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Wait);
        assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Decay);
        assert_eq!(state.num_times_lr_decayed, 1);
    }

    #[test]
    fn test_patience_asymmetry() {
        // initial_patience=1, patience=3: first decay after a single failed
        // checkpoint, later decays only after three
        let schedule = schedule(3, Some(1));
        let mut state = TrainingState::new(1);

        assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Decay);
        assert_eq!(state.num_times_lr_decayed, 1);

        // improvement elsewhere resets cur_attempt
        state.cur_attempt = 0;

        assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Wait);
        assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Wait);
        assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Decay);
        assert_eq!(state.num_times_lr_decayed, 2);
    }

    #[test]
    fn test_early_stop_after_decay_budget() {
        // lr_decay_times=2: the third eligible decay stops instead
        let schedule = LearningSchedule::new(0.5, 2, 1, None, false).unwrap();
        let mut state = TrainingState::new(1);

        assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Decay);
        state.cur_attempt = 0;
        assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Decay);
        state.cur_attempt = 0;
        assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Stop);
        assert_eq!(state.num_times_lr_decayed, 3);
    }

    #[test]
    fn test_initial_patience_only_before_first_decay() {
        // with initial_patience=2 and patience=1, the steady-state rule must
        // not fire while num_times_lr_decayed == 0
        let schedule = schedule(1, Some(2));
        let mut state = TrainingState::new(1);

        assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Wait);
        assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Decay);

        state.cur_attempt = 0;
        assert_eq!(schedule.on_no_improvement(&mut state), ScheduleAction::Decay);
    }
}
