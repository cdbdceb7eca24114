//! Run an experiment: training interleaved with evaluation and checkpoints.
mod clock;
mod config;
mod history;
use crate::{
    checkpoint::{merge_diagnostics, CheckpointRecord, Checkpointer},
    episode::TrainEpisodeRunner,
    evaluator::EvalRunner,
    record::{NullRecorder, Record, RecordStorage, RecordValue::Scalar, Recorder},
    Agent, Env,
};
use anyhow::{bail, Result};
use chrono::Local;
pub use clock::Clock;
pub use config::{BudgetPolicy, CheckpointConfig, ContradictionPolicy, ExperimentConfig};
pub use history::{EpisodeRecord, HistorySeries};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Phase of an [`ExperimentController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, not yet run.
    Init,

    /// Between training episodes.
    Running,

    /// In an evaluation session.
    Evaluating,

    /// Writing a checkpoint.
    Checkpointing,

    /// Final evaluation and checkpoint after the training loop.
    Finalizing,

    /// Finished.
    Done,
}

/// Statistics of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Statistics of all training episodes and evaluation sessions.
    pub history: HistorySeries,

    /// Training time in seconds.
    pub train_time: f64,

    /// Evaluation time in seconds.
    pub eval_time: f64,

    /// Completed training episodes.
    pub total_train_episodes: usize,

    /// Training timesteps.
    pub timesteps_elapsed: usize,
}

impl ExperimentResult {
    /// Returns a formatted string.
    pub fn fmt(&self) -> String {
        let mut s = "train_episodes, timesteps, eval_sessions, train_time, eval_time\n".to_string();
        s += format!(
            "{}, {}, {}, {}, {}\n",
            self.total_train_episodes,
            self.timesteps_elapsed,
            self.history.eval_sessions(),
            self.train_time,
            self.eval_time
        )
        .as_str();
        s
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the run loop of an experiment.
///
/// # Run loop
///
/// 1. Evaluate the agent once before training, recorded at timestep 0.
/// 2. While `timesteps_elapsed < total_timesteps` and, if `max_episodes > 0`,
///    `train_episodes < max_episodes`:
///     1. Run one training episode with [`TrainEpisodeRunner`].
///     2. If `timesteps_since_last_eval >= eval_interval_timesteps`, run an
///        evaluation session with [`EvalRunner`].
///     3. If `timesteps_elapsed - last_checkpoint_timestep >= checkpoint_interval`,
///        write a checkpoint.
/// 3. Evaluate once more and write a final checkpoint.
///
/// Evaluation and checkpoints are decided between episodes, so an interval may
/// be overshot by the length of the episode in progress.
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Init
///     Init --> Evaluating: baseline
///     Evaluating --> Running
///     Running --> Evaluating
///     Running --> Checkpointing
///     Checkpointing --> Running
///     Running --> Finalizing
///     Finalizing --> Done
///     Done --> [*]
/// ```
///
/// Any error of the agent, an environment or the [`Checkpointer`] ends the run
/// and is returned from [`ExperimentController::run`].
pub struct ExperimentController<E, A>
where
    E: Env,
    A: Agent<E>,
{
    config: ExperimentConfig,
    sweep_index: usize,
    env_name: String,
    agent_name: String,
    agent: A,
    trainer: TrainEpisodeRunner<E>,
    evaluator: EvalRunner<E>,
    checkpointer: Box<dyn Checkpointer>,
    recorder: Box<dyn Recorder>,
    clock: Clock,
    history: HistorySeries,
    phase: Phase,
}

impl<E, A> ExperimentController<E, A>
where
    E: Env,
    A: Agent<E>,
{
    /// Constructs a controller on a training and a separate evaluation environment.
    ///
    /// The names and sweep index in `checkpoint_config` are written into
    /// every [`CheckpointRecord`].
    pub fn new(
        config: ExperimentConfig,
        checkpoint_config: &CheckpointConfig,
        agent: A,
        env: E,
        eval_env: E,
        checkpointer: Box<dyn Checkpointer>,
    ) -> Self {
        let trainer =
            TrainEpisodeRunner::new(env, config.budget_policy, config.contradiction_policy);
        Self {
            sweep_index: checkpoint_config.sweep_index,
            env_name: checkpoint_config.env_name.clone(),
            agent_name: checkpoint_config.agent_name.clone(),
            config,
            agent,
            trainer,
            evaluator: EvalRunner::new(eval_env),
            checkpointer,
            recorder: Box::new(NullRecorder::default()),
            clock: Clock::new(),
            history: HistorySeries::default(),
            phase: Phase::Init,
        }
    }

    /// Builds both environments from `env_config`.
    ///
    /// The training environment is seeded with `config.seed`, the evaluation
    /// environment with `config.seed + 1`, wrapping at `i64::MAX`.
    pub fn build(
        config: ExperimentConfig,
        checkpoint_config: &CheckpointConfig,
        env_config: &E::Config,
        agent: A,
        checkpointer: Box<dyn Checkpointer>,
    ) -> Result<Self> {
        let env = E::build(env_config, config.seed)?;
        let eval_env = E::build(env_config, config.seed.wrapping_add(1))?;
        Ok(Self::new(
            config,
            checkpoint_config,
            agent,
            env,
            eval_env,
            checkpointer,
        ))
    }

    /// Sets the recorder receiving per-episode and per-session records.
    pub fn with_recorder(mut self, recorder: Box<dyn Recorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// The agent.
    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// The counters of the run.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Statistics collected so far.
    pub fn history(&self) -> &HistorySeries {
        &self.history
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!("{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Runs an evaluation session recorded at the current timestep.
    fn evaluate(&mut self) -> Result<()> {
        let prev = self.phase;
        self.set_phase(Phase::Evaluating);

        let timesteps = self.clock.timesteps_elapsed();
        info!("Starts evaluation at {} timesteps", timesteps);
        self.agent.eval();
        let session = self.evaluator.run(&mut self.agent, self.config.eval_episodes)?;
        self.agent.train();

        self.clock.finish_eval(session.wall_time);
        self.history
            .push_eval(timesteps, &session.returns, &session.steps);

        let mut storage = RecordStorage::new();
        for ret in session.returns.iter() {
            storage.store(Record::from_scalar("eval_return", *ret));
        }
        let mut record = storage.aggregate();
        record.insert("timesteps", Scalar(timesteps as _));
        record.insert("eval_time", Scalar(session.wall_time.as_secs_f32()));
        self.recorder.write(record);

        self.set_phase(prev);
        Ok(())
    }

    /// Builds a checkpoint record of the current state.
    pub fn checkpoint_record(&self) -> CheckpointRecord {
        let diagnostics = merge_diagnostics(vec![
            self.agent.diagnostics(),
            self.trainer.env().diagnostics(),
            self.evaluator.env().diagnostics(),
        ]);
        CheckpointRecord::new(
            self.sweep_index,
            self.env_name.as_str(),
            self.agent_name.as_str(),
            &self.clock,
            &self.history,
            self.agent.parameters(),
            diagnostics,
            &self.config,
        )
    }

    fn checkpoint(&mut self) -> Result<()> {
        let prev = self.phase;
        self.set_phase(Phase::Checkpointing);

        info!("Saving at {} timesteps", self.clock.timesteps_elapsed());
        let record = self.checkpoint_record();
        self.checkpointer.save(&record)?;
        self.clock.mark_checkpoint();

        self.set_phase(prev);
        Ok(())
    }

    /// Runs one training episode and records it.
    fn train_episode(&mut self) -> Result<()> {
        let episode = self.trainer.run_episode(
            &mut self.agent,
            &mut self.clock,
            self.config.total_timesteps,
        )?;
        let ix = self.clock.train_episodes();
        self.clock.finish_episode(episode.wall_time);
        self.history.push_train(&episode);

        info!(
            "Train episode {}: timesteps = {}, return = {}, steps = {}, elapsed = {:?}",
            ix,
            self.clock.timesteps_elapsed(),
            episode.ret,
            episode.steps,
            episode.wall_time
        );
        self.recorder.write(Record::from_slice(&[
            ("episode", Scalar(ix as _)),
            ("timesteps", Scalar(self.clock.timesteps_elapsed() as _)),
            ("return", Scalar(episode.ret)),
            ("steps", Scalar(episode.steps as _)),
            ("wall_time", Scalar(episode.wall_time.as_secs_f32())),
        ]));
        Ok(())
    }

    /// Runs the experiment.
    ///
    /// A controller runs only once; a second call returns an error.
    pub fn run(&mut self) -> Result<ExperimentResult> {
        if self.phase != Phase::Init {
            bail!("Experiment has already been run (phase {:?})", self.phase);
        }
        let timer = SystemTime::now();
        info!("Starts experiment at {}", Local::now());

        self.evaluate()?;
        self.set_phase(Phase::Running);

        let total_timesteps = self.config.total_timesteps;
        let episode_cap = self.config.episode_cap();
        while self.clock.may_start_episode(total_timesteps, episode_cap) {
            self.train_episode()?;

            if self.clock.eval_due(self.config.eval_interval_timesteps) {
                self.evaluate()?;
            }

            if self.clock.checkpoint_due(self.config.checkpoint_interval) {
                self.checkpoint()?;
            }
        }

        self.set_phase(Phase::Finalizing);
        self.evaluate()?;
        self.checkpoint()?;
        self.set_phase(Phase::Done);

        info!("Ends experiment at {}", Local::now());
        info!("Total time: {:?}", timer.elapsed()?);
        info!("Training time: {:?}", self.clock.train_time());
        info!("Evaluation time: {:?}", self.clock.eval_time());

        Ok(ExperimentResult {
            history: self.history.clone(),
            train_time: self.clock.train_time().as_secs_f64(),
            eval_time: self.clock.eval_time().as_secs_f64(),
            total_train_episodes: self.clock.train_episodes(),
            timesteps_elapsed: self.clock.timesteps_elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        checkpoint::NullCheckpointer,
        dummy::{DummyAgent, DummyEnv, DummyEnvConfig},
    };

    fn controller(
        config: ExperimentConfig,
        env_config: DummyEnvConfig,
    ) -> ExperimentController<DummyEnv, DummyAgent> {
        ExperimentController::build(
            config,
            &CheckpointConfig::new("unused", 0, "Dummy", "Dummy"),
            &env_config,
            DummyAgent::default(),
            Box::new(NullCheckpointer::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_phase_after_run() -> Result<()> {
        let mut controller = controller(
            ExperimentConfig::default().total_timesteps(4).eval_episodes(1),
            DummyEnvConfig::default().terminal_at(2),
        );
        assert_eq!(controller.phase(), Phase::Init);
        controller.run()?;
        assert_eq!(controller.phase(), Phase::Done);
        assert!(controller.agent().is_train());
        Ok(())
    }

    #[test]
    fn test_run_twice_fails() -> Result<()> {
        let mut controller = controller(
            ExperimentConfig::default().total_timesteps(2).eval_episodes(1),
            DummyEnvConfig::default().terminal_at(1),
        );
        controller.run()?;
        assert!(controller.run().is_err());
        Ok(())
    }

    #[test]
    fn test_environments_are_seeded_apart() -> Result<()> {
        let seeded = controller(
            ExperimentConfig::default().seed(11),
            DummyEnvConfig::default(),
        );
        assert_eq!(seeded.trainer.env().seed(), 11);
        assert_eq!(seeded.evaluator.env().seed(), 12);

        let wrapped = controller(
            ExperimentConfig::default().seed(i64::MAX),
            DummyEnvConfig::default(),
        );
        assert_eq!(wrapped.trainer.env().seed(), i64::MAX);
        assert_eq!(wrapped.evaluator.env().seed(), i64::MIN);
        Ok(())
    }
}
