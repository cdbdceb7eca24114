//! Deterministic environment and agent used in tests.
use crate::{
    record::{Record, RecordValue},
    Act, Agent, Env, Obs, Policy, Step, Transition,
};
use anyhow::{bail, Result};

/// Dummy observation.
#[derive(Clone, Debug)]
pub struct DummyObs {
    /// Steps taken in the current episode.
    pub episode_step: usize,

    /// A random draw of the environment.
    pub noise: f32,
}

impl Obs for DummyObs {}

/// Dummy action.
#[derive(Clone, Debug)]
pub struct DummyAct(pub i64);

impl Act for DummyAct {}

/// Configuration of [`DummyEnv`].
#[derive(Clone, Debug)]
pub struct DummyEnvConfig {
    name: String,
    reward: f32,
    max_episode_steps: Option<usize>,
    terminal_at: Option<usize>,
    step_limit_flag_at: Option<usize>,
    fail_at_step: Option<usize>,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            name: "dummy".to_string(),
            reward: 1.0,
            max_episode_steps: None,
            terminal_at: None,
            step_limit_flag_at: None,
            fail_at_step: None,
        }
    }
}

impl DummyEnvConfig {
    /// Name reported in diagnostics under `"source"`.
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.name = v.into();
        self
    }

    /// Reward of every step.
    pub fn reward(mut self, v: f32) -> Self {
        self.reward = v;
        self
    }

    /// Step limit exposed by [`Env::max_episode_steps`].
    pub fn max_episode_steps(mut self, v: usize) -> Self {
        self.max_episode_steps = Some(v);
        self
    }

    /// Episode step at which the environment reports a terminal state.
    pub fn terminal_at(mut self, v: usize) -> Self {
        self.terminal_at = Some(v);
        self
    }

    /// Episode step at which the environment reports its own step limit.
    pub fn step_limit_flag_at(mut self, v: usize) -> Self {
        self.step_limit_flag_at = Some(v);
        self
    }

    /// Total step (counted over all episodes) at which [`Env::step`] fails.
    pub fn fail_at_step(mut self, v: usize) -> Self {
        self.fail_at_step = Some(v);
        self
    }
}

/// An environment with a constant reward and configurable episode ends.
pub struct DummyEnv {
    config: DummyEnvConfig,
    seed: i64,
    rng: fastrand::Rng,
    episode_step: usize,
    resets: usize,
    total_steps: usize,
}

impl DummyEnv {
    /// Constructs the environment.
    pub fn new(config: DummyEnvConfig, seed: i64) -> Self {
        Self {
            config,
            seed,
            rng: fastrand::Rng::with_seed(seed as u64),
            episode_step: 0,
            resets: 0,
            total_steps: 0,
        }
    }

    /// The seed given at construction.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Number of calls of [`Env::reset`].
    pub fn resets(&self) -> usize {
        self.resets
    }

    /// Number of steps over all episodes.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    fn obs(&mut self) -> DummyObs {
        DummyObs {
            episode_step: self.episode_step,
            noise: self.rng.f32(),
        }
    }
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Obs = DummyObs;
    type Act = DummyAct;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self::new(config.clone(), seed))
    }

    fn reset(&mut self) -> Result<(Self::Obs, Record)> {
        self.episode_step = 0;
        self.resets += 1;
        Ok((self.obs(), Record::empty()))
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        if self.config.fail_at_step == Some(self.total_steps + 1) {
            bail!("Dummy environment failed at step {}", self.total_steps + 1);
        }
        self.episode_step += 1;
        self.total_steps += 1;

        let is_terminated = self.config.terminal_at == Some(self.episode_step);
        let is_truncated = self.config.step_limit_flag_at == Some(self.episode_step);
        let step = Step::new(
            self.obs(),
            a.clone(),
            self.config.reward,
            is_terminated,
            is_truncated,
        );
        Ok((step, Record::from_scalar("episode_step", self.episode_step as _)))
    }

    fn max_episode_steps(&self) -> Option<usize> {
        self.config.max_episode_steps
    }

    fn diagnostics(&self) -> Record {
        Record::from_slice(&[
            ("source", RecordValue::String(self.config.name.clone())),
            ("resets", RecordValue::Scalar(self.resets as _)),
            ("env_steps", RecordValue::Scalar(self.total_steps as _)),
        ])
    }
}

/// What [`DummyAgent`] saw in one call of [`Agent::update`].
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateLog {
    /// Reward of the transition.
    pub reward: f32,

    /// Natural terminal.
    pub is_terminated: bool,

    /// Truncation.
    pub is_truncated: bool,

    /// [`Transition::bootstrap_mask`].
    pub bootstrap_mask: f32,

    /// The agent was in training mode.
    pub in_train_mode: bool,
}

/// An agent always taking the same action and logging its updates.
pub struct DummyAgent {
    train: bool,
    resets: usize,
    updates: Vec<UpdateLog>,
    eval_samples: usize,
    trajectory_steps: Option<usize>,
    failing_trajectory: bool,
    trajectories: Vec<Vec<DummyObs>>,
}

impl Default for DummyAgent {
    fn default() -> Self {
        Self {
            train: true,
            resets: 0,
            updates: vec![],
            eval_samples: 0,
            trajectory_steps: None,
            failing_trajectory: false,
            trajectories: vec![],
        }
    }
}

impl DummyAgent {
    /// Requests evaluation trajectories of `n` observations.
    pub fn with_trajectory_steps(mut self, n: usize) -> Self {
        self.trajectory_steps = Some(n);
        self
    }

    /// Makes [`Agent::push_eval_trajectory`] fail.
    pub fn with_failing_trajectory(mut self) -> Self {
        self.failing_trajectory = true;
        self
    }

    /// All updates so far.
    pub fn updates(&self) -> &[UpdateLog] {
        &self.updates
    }

    /// Number of calls of [`Agent::reset`].
    pub fn resets(&self) -> usize {
        self.resets
    }

    /// Actions sampled in evaluation mode.
    pub fn eval_samples(&self) -> usize {
        self.eval_samples
    }

    /// Received evaluation trajectories.
    pub fn trajectories(&self) -> &[Vec<DummyObs>] {
        &self.trajectories
    }
}

impl Policy<DummyEnv> for DummyAgent {
    fn sample(&mut self, _obs: &DummyObs) -> Result<DummyAct> {
        if !self.train {
            self.eval_samples += 1;
        }
        Ok(DummyAct(0))
    }
}

impl Agent<DummyEnv> for DummyAgent {
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn update(&mut self, transition: Transition<DummyEnv>) -> Result<()> {
        self.updates.push(UpdateLog {
            reward: transition.reward,
            is_terminated: transition.is_terminated,
            is_truncated: transition.is_truncated,
            bootstrap_mask: transition.bootstrap_mask(),
            in_train_mode: self.train,
        });
        Ok(())
    }

    fn parameters(&self) -> Record {
        Record::from_scalar("updates", self.updates.len() as _)
    }

    fn diagnostics(&self) -> Record {
        Record::from_slice(&[
            ("source", RecordValue::String("agent".to_string())),
            ("agent_resets", RecordValue::Scalar(self.resets as _)),
        ])
    }

    fn eval_trajectory_steps(&self) -> Option<usize> {
        self.trajectory_steps
    }

    fn push_eval_trajectory(&mut self, states: Vec<DummyObs>) -> Result<()> {
        if self.failing_trajectory {
            bail!("Dummy agent rejected the trajectory");
        }
        self.trajectories.push(states);
        Ok(())
    }
}
