//! The training task state machine
//!
//! `SimpleTrainingTask` coordinates corpus loading, reseedable shuffling,
//! infinite minibatch iteration, loss aggregation, dev-set evaluation gating
//! and the patience-based decay / early-stopping policy. All of it hangs off
//! a single `TrainingState` record whose persisted epoch seed makes a crashed
//! run resumable with the exact same minibatch order.

use super::events::{EpochInfo, EpochListener, ListenerRegistry};
use super::loss::{LossRecord, ADDITIONAL_LOSS_NAME, PRIMARY_LOSS_NAME};
use super::schedule::{LearningSchedule, ScheduleAction};
use super::state::{TrainingState, MAX_EPOCH_SEED};
use super::tracker::ProgressTracker;
use crate::augment::{AugmentationPipeline, RefreshOutcome};
use crate::batch::{Batch, Batcher, SrcBatcher};
use crate::config::{validate_config, TrainingConfig};
use crate::corpus::{LoadOptions, ParallelCorpus, SentenceReader};
use crate::error::{Error, Result};
use crate::eval::DevTask;
use crate::model::{Detached, LossCalculator, LossValue, MleLoss, TranslationModel};
use crate::optim::Optimizer;
use crate::persist::ParamStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::Path;

/// A training task performs training steps and keeps track of training
/// state, but does not implement the outer training loop.
pub trait TrainingTask {
    /// True iff training is finished and `training_step` should not be
    /// called again
    fn should_stop_training(&self) -> bool;

    /// Produce the next (src, trg) minibatch pair, crossing epoch boundaries
    /// transparently
    fn next_minibatch(&mut self) -> Result<(Batch, Batch)>;

    /// Forward pass for one minibatch, returning the aggregated loss record
    fn training_step(&mut self, src: &Batch, trg: &Batch) -> Result<LossRecord>;

    /// True when a dev checkpoint is due
    fn checkpoint_needed(&self) -> bool;

    /// Perform a dev checkpoint.
    ///
    /// With `control_learning_schedule` false, only evaluates dev data; with
    /// true, also drives best-score tracking, learning-rate decay and early
    /// stopping. Returns whether the caller should persist the model.
    fn checkpoint(&mut self, control_learning_schedule: bool) -> Result<bool>;

    /// Persist the current model as the best checkpoint
    fn persist_model(&mut self) -> Result<()>;

    /// The task's training state
    fn state(&self) -> &TrainingState;

    /// True once the decay budget has been exhausted
    fn early_stopping_reached(&self) -> bool;
}

/// Collects the collaborators a `SimpleTrainingTask` needs, then builds it.
///
/// Building validates the configuration, runs the initial data augmentation
/// if configured, reads and freezes the corpus, loads pretrained parameters
/// and packs the first set of batches.
pub struct TaskBuilder {
    config: TrainingConfig,
    model: Option<Box<dyn TranslationModel>>,
    optimizer: Option<Box<dyn Optimizer>>,
    src_reader: Option<Box<dyn SentenceReader>>,
    trg_reader: Option<Box<dyn SentenceReader>>,
    batcher: Option<Box<dyn Batcher>>,
    loss_calculator: Box<dyn LossCalculator>,
    dev_tasks: Vec<Box<dyn DevTask>>,
    param_store: Option<Box<dyn ParamStore>>,
    listeners: ListenerRegistry,
}

impl TaskBuilder {
    fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            model: None,
            optimizer: None,
            src_reader: None,
            trg_reader: None,
            batcher: None,
            loss_calculator: Box::new(MleLoss),
            dev_tasks: Vec::new(),
            param_store: None,
            listeners: ListenerRegistry::new(),
        }
    }

    /// The model to train
    pub fn model(mut self, model: impl TranslationModel + 'static) -> Self {
        self.model = Some(Box::new(model));
        self
    }

    /// The optimizer whose learning rate the schedule controls
    pub fn optimizer(mut self, optimizer: impl Optimizer + 'static) -> Self {
        self.optimizer = Some(Box::new(optimizer));
        self
    }

    /// Source- and target-side corpus readers
    pub fn readers(
        mut self,
        src: impl SentenceReader + 'static,
        trg: impl SentenceReader + 'static,
    ) -> Self {
        self.src_reader = Some(Box::new(src));
        self.trg_reader = Some(Box::new(trg));
        self
    }

    /// Override the default source-length batcher
    pub fn batcher(mut self, batcher: impl Batcher + 'static) -> Self {
        self.batcher = Some(Box::new(batcher));
        self
    }

    /// Override the default maximum-likelihood loss strategy
    pub fn loss_calculator(mut self, calc: impl LossCalculator + 'static) -> Self {
        self.loss_calculator = Box::new(calc);
        self
    }

    /// Add a dev-set evaluation task; the first registered task's first
    /// score becomes the primary schedule metric
    pub fn dev_task(mut self, task: impl DevTask + 'static) -> Self {
        self.dev_tasks.push(Box::new(task));
        self
    }

    /// Attach the model's parameter store
    pub fn param_store(mut self, store: impl ParamStore + 'static) -> Self {
        self.param_store = Some(Box::new(store));
        self
    }

    /// Register an epoch-start listener
    pub fn listener(mut self, listener: impl EpochListener + 'static) -> Self {
        self.listeners.register(listener);
        self
    }

    /// Build the task, performing all construction-time work
    pub fn build(self) -> Result<SimpleTrainingTask> {
        validate_config(&self.config)?;
        let config = self.config;

        let schedule = LearningSchedule::new(
            config.lr_decay,
            config.lr_decay_times,
            config.patience,
            config.initial_patience,
            config.restart_trainer,
        )?;

        let model = self
            .model
            .ok_or_else(|| Error::Config("training task requires a model".to_string()))?;
        let optimizer = self
            .optimizer
            .ok_or_else(|| Error::Config("training task requires an optimizer".to_string()))?;
        let mut src_reader = self
            .src_reader
            .ok_or_else(|| Error::Config("training task requires corpus readers".to_string()))?;
        let mut trg_reader = self
            .trg_reader
            .ok_or_else(|| Error::Config("training task requires corpus readers".to_string()))?;
        let batcher = self
            .batcher
            .unwrap_or_else(|| Box::new(SrcBatcher::new(config.batch_size)));

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let state = TrainingState::new(rng.random_range(1..=MAX_EPOCH_SEED));

        let mut augmentation = config.reload_command.clone().map(AugmentationPipeline::new);
        if let Some(pipeline) = &mut augmentation {
            pipeline.run_initial()?;
        }

        let load_options = LoadOptions {
            sample_train_sents: config.sample_train_sents,
            max_num_train_sents: config.max_num_train_sents,
            max_src_len: config.max_src_len,
            max_trg_len: config.max_trg_len,
        };
        let corpus = ParallelCorpus::load(
            src_reader.as_mut(),
            trg_reader.as_mut(),
            &config.src_file,
            &config.trg_file,
            &load_options,
            &mut rng,
        )?;
        src_reader.freeze();
        trg_reader.freeze();

        let mut param_store = self.param_store;
        if let (Some(path), Some(store)) = (&config.pretrained_model_file, &mut param_store) {
            store.load(path)?;
        }

        let (src_batches, trg_batches) = batcher.pack(corpus.src(), corpus.trg(), &mut rng);
        let tracker = ProgressTracker::new(config.dev_every, config.name.clone());

        Ok(SimpleTrainingTask {
            run_for_epochs: config.run_for_epochs,
            model_file: config.model_file.clone(),
            src_file: config.src_file.clone(),
            trg_file: config.trg_file.clone(),
            load_options,
            schedule,
            state,
            early_stopping_reached: false,
            rng,
            model,
            optimizer,
            loss_calculator: self.loss_calculator,
            batcher,
            src_reader,
            trg_reader,
            corpus,
            src_batches,
            trg_batches,
            minibatch_order: Vec::new(),
            augmentation,
            dev_tasks: self.dev_tasks,
            param_store,
            listeners: self.listeners,
            tracker,
            started: false,
            pending_step: false,
        })
    }
}

/// Training task over a single parallel corpus.
pub struct SimpleTrainingTask {
    run_for_epochs: u32,
    model_file: Option<std::path::PathBuf>,
    src_file: std::path::PathBuf,
    trg_file: std::path::PathBuf,
    load_options: LoadOptions,

    schedule: LearningSchedule,
    state: TrainingState,
    early_stopping_reached: bool,
    rng: StdRng,

    model: Box<dyn TranslationModel>,
    optimizer: Box<dyn Optimizer>,
    loss_calculator: Box<dyn LossCalculator>,
    batcher: Box<dyn Batcher>,
    src_reader: Box<dyn SentenceReader>,
    trg_reader: Box<dyn SentenceReader>,

    corpus: ParallelCorpus,
    src_batches: Vec<Batch>,
    trg_batches: Vec<Batch>,
    minibatch_order: Vec<usize>,

    augmentation: Option<AugmentationPipeline>,
    dev_tasks: Vec<Box<dyn DevTask>>,
    param_store: Option<Box<dyn ParamStore>>,
    listeners: ListenerRegistry,
    tracker: ProgressTracker,

    /// Whether the first epoch has been entered
    started: bool,
    /// A handed-out minibatch has not yet been counted as consumed
    pending_step: bool,
}

impl SimpleTrainingTask {
    /// Start collecting collaborators for a task with this configuration
    pub fn builder(config: TrainingConfig) -> TaskBuilder {
        TaskBuilder::new(config)
    }

    /// Current number of minibatches; may change between epochs
    pub fn cur_num_minibatches(&self) -> usize {
        self.src_batches.len()
    }

    /// Current number of parallel sentences; may change between epochs when
    /// data regeneration is active
    pub fn cur_num_sentences(&self) -> usize {
        self.corpus.len()
    }

    /// The shuffled minibatch order of the current epoch
    pub fn minibatch_order(&self) -> &[usize] {
        &self.minibatch_order
    }

    /// The task's progress tracker
    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// Current learning rate
    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }

    /// Write the training state as JSON for crash recovery
    pub fn save_state(&self, path: &Path) -> Result<()> {
        self.state.save(path)
    }

    /// Restore a persisted training state, replaying the epoch's shuffle
    /// from its seed so the next pull continues where the run left off.
    pub fn restore_state(&mut self, state: TrainingState) -> Result<()> {
        self.rng = StdRng::seed_from_u64(state.epoch_seed as u64);
        let (src_batches, trg_batches) =
            self.batcher
                .pack(self.corpus.src(), self.corpus.trg(), &mut self.rng);
        self.src_batches = src_batches;
        self.trg_batches = trg_batches;
        self.minibatch_order = (0..self.cur_num_minibatches()).collect();
        self.minibatch_order.shuffle(&mut self.rng);
        self.started = state.epoch_num > 0;
        self.pending_step = false;
        self.state = state;
        Ok(())
    }

    fn reload_corpus(&mut self) -> Result<()> {
        self.corpus = ParallelCorpus::load(
            self.src_reader.as_mut(),
            self.trg_reader.as_mut(),
            &self.src_file,
            &self.trg_file,
            &self.load_options,
            &mut self.rng,
        )?;
        Ok(())
    }

    /// Shift internal state to the next epoch: refresh augmented data, draw
    /// and apply a fresh epoch seed, re-pack batches, shuffle the minibatch
    /// order and fire the epoch-start notification.
    pub fn advance_epoch(&mut self) -> Result<()> {
        if let Some(pipeline) = &mut self.augmentation {
            match pipeline.refresh(self.state.epoch_num)? {
                RefreshOutcome::Reloaded => {
                    if self.state.epoch_num > 0 {
                        println!("using reloaded data");
                    }
                    self.reload_corpus()?;
                }
                RefreshOutcome::StaleData => {
                    println!("new data set is not ready yet, using data from last epoch.");
                }
            }
        }

        self.state.epoch_seed = self.rng.random_range(1..=MAX_EPOCH_SEED);
        self.rng = StdRng::seed_from_u64(self.state.epoch_seed as u64);
        let (src_batches, trg_batches) =
            self.batcher
                .pack(self.corpus.src(), self.corpus.trg(), &mut self.rng);
        self.src_batches = src_batches;
        self.trg_batches = trg_batches;
        self.state.epoch_num += 1;
        self.state.steps_into_epoch = 0;
        self.minibatch_order = (0..self.cur_num_minibatches()).collect();
        self.minibatch_order.shuffle(&mut self.rng);

        let info = EpochInfo {
            epoch_num: self.state.epoch_num,
            num_sents: self.cur_num_sentences(),
        };
        self.tracker.new_epoch(&info);
        self.listeners.fire(&info);
        Ok(())
    }
}

impl TrainingTask for SimpleTrainingTask {
    fn should_stop_training(&self) -> bool {
        self.early_stopping_reached
            || self.state.epoch_num > self.run_for_epochs
            || (self.state.epoch_num == self.run_for_epochs
                && self.state.steps_into_epoch >= self.cur_num_minibatches().saturating_sub(1))
    }

    fn next_minibatch(&mut self) -> Result<(Batch, Batch)> {
        if self.pending_step {
            self.state.steps_into_epoch += 1;
            self.pending_step = false;
        }
        if !self.started || self.state.steps_into_epoch >= self.cur_num_minibatches() {
            self.advance_epoch()?;
            self.started = true;
            if self.cur_num_minibatches() == 0 {
                return Err(Error::Config(
                    "training corpus packed into zero minibatches".to_string(),
                ));
            }
        }
        let idx = self.minibatch_order[self.state.steps_into_epoch];
        self.pending_step = true;
        Ok((self.src_batches[idx].clone(), self.trg_batches[idx].clone()))
    }

    fn training_step(&mut self, src: &Batch, trg: &Batch) -> Result<LossRecord> {
        let mut record = LossRecord::new();
        let primary = match self
            .model
            .calc_loss(src, trg, self.loss_calculator.as_ref())?
        {
            LossValue::Scalar(value) => {
                record.add(PRIMARY_LOSS_NAME, value);
                value
            }
            LossValue::Bundle(terms) => {
                assert!(!terms.is_empty(), "model returned an empty loss bundle");
                let mut sum = 0.0;
                for (name, value) in terms {
                    record.add(name, value);
                    sum += value;
                }
                sum
            }
        };

        if let Some(additional) = self.model.calc_additional_loss(Detached::new(-primary)) {
            record.add(ADDITIONAL_LOSS_NAME, additional);
        }

        self.tracker.update_epoch_loss(src, trg, &record);
        self.tracker.report_train_process();
        Ok(record)
    }

    fn checkpoint_needed(&self) -> bool {
        self.tracker.should_report_dev()
    }

    fn checkpoint(&mut self, control_learning_schedule: bool) -> Result<bool> {
        let mut needs_save = false;
        self.tracker.new_dev();

        if !self.dev_tasks.is_empty() {
            let mut dev_scores = Vec::new();
            for dev_task in &mut self.dev_tasks {
                dev_scores.extend(dev_task.eval()?);
            }
            if let Some(primary) = dev_scores.first() {
                self.tracker.set_dev_score(primary.clone());
            }
            for score in dev_scores.iter().skip(1) {
                self.tracker.report_auxiliary_score(score);
            }
        }

        if control_learning_schedule {
            println!("> Checkpoint");
            if self.tracker.check_and_update_best() {
                needs_save = self.model_file.is_some();
                self.state.cur_attempt = 0;
            } else {
                match self.schedule.on_no_improvement(&mut self.state) {
                    ScheduleAction::Wait => {}
                    ScheduleAction::Stop => {
                        println!("  Early stopping");
                        self.early_stopping_reached = true;
                    }
                    ScheduleAction::Decay => {
                        let new_lr = self.optimizer.lr() * self.schedule.lr_decay();
                        self.optimizer.set_lr(new_lr);
                        println!("  new learning rate: {new_lr}");
                        if self.schedule.restart_trainer() {
                            println!("  restarting trainer and reverting learned weights to best checkpoint..");
                            self.optimizer.restart();
                            if let Some(store) = &mut self.param_store {
                                store.revert_to_best()?;
                            }
                        }
                    }
                }
            }
        }

        Ok(needs_save)
    }

    fn persist_model(&mut self) -> Result<()> {
        if let Some(store) = &mut self.param_store {
            store.save_best()?;
        }
        Ok(())
    }

    fn state(&self) -> &TrainingState {
        &self.state
    }

    fn early_stopping_reached(&self) -> bool {
        self.early_stopping_reached
    }
}
