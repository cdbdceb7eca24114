//! Configuration of [`ExperimentController`](super::ExperimentController).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// What happens to the running training episode when the timestep budget
/// is exhausted.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum BudgetPolicy {
    /// The episode ends right after the step that exhausts the budget.
    /// The last transition is passed to the agent as a truncation.
    CutEpisode,

    /// The episode runs until its terminal state or step limit, so
    /// `timesteps_elapsed` may exceed `total_timesteps`.
    FinishEpisode,
}

/// How a step reporting both a terminal state and a step-limit truncation
/// is handled.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum ContradictionPolicy {
    /// Log a warning, count it, and pass the transition as a truncation.
    Warn,

    /// Halt the run with
    /// [`HarnessError::ContradictoryTermination`](crate::error::HarnessError::ContradictoryTermination).
    Fail,
}

/// Configuration of [`ExperimentController`](super::ExperimentController).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ExperimentConfig {
    /// The number of episodes in each evaluation session.
    pub eval_episodes: usize,

    /// Training stops once this many environment steps have been taken.
    pub total_timesteps: usize,

    /// Interval of evaluation in environment steps.
    pub eval_interval_timesteps: usize,

    /// Interval of checkpointing in environment steps.
    #[serde(alias = "steps_to_save")]
    pub checkpoint_interval: usize,

    /// The maximum number of training episodes. No limit if `<= 0`.
    pub max_episodes: i64,

    /// See [`BudgetPolicy`].
    pub budget_policy: BudgetPolicy,

    /// See [`ContradictionPolicy`].
    pub contradiction_policy: ContradictionPolicy,

    /// Seed of the training environment. The evaluation environment uses `seed + 1`.
    pub seed: i64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            eval_episodes: 10,
            total_timesteps: 100_000,
            eval_interval_timesteps: 10_000,
            checkpoint_interval: 1_000_000,
            max_episodes: -1,
            budget_policy: BudgetPolicy::CutEpisode,
            contradiction_policy: ContradictionPolicy::Warn,
            seed: 0,
        }
    }
}

impl ExperimentConfig {
    /// Sets the number of episodes per evaluation session.
    pub fn eval_episodes(mut self, v: usize) -> Self {
        self.eval_episodes = v;
        self
    }

    /// Sets the total number of training timesteps.
    pub fn total_timesteps(mut self, v: usize) -> Self {
        self.total_timesteps = v;
        self
    }

    /// Sets the interval of evaluation in environment steps.
    pub fn eval_interval_timesteps(mut self, v: usize) -> Self {
        self.eval_interval_timesteps = v;
        self
    }

    /// Sets the interval of checkpointing in environment steps.
    pub fn checkpoint_interval(mut self, v: usize) -> Self {
        self.checkpoint_interval = v;
        self
    }

    /// Sets the maximum number of training episodes, `<= 0` for no limit.
    pub fn max_episodes(mut self, v: i64) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the [`BudgetPolicy`].
    pub fn budget_policy(mut self, v: BudgetPolicy) -> Self {
        self.budget_policy = v;
        self
    }

    /// Sets the [`ContradictionPolicy`].
    pub fn contradiction_policy(mut self, v: ContradictionPolicy) -> Self {
        self.contradiction_policy = v;
        self
    }

    /// Sets the seed of the training environment.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// The episode limit, if any.
    pub fn episode_cap(&self) -> Option<usize> {
        if self.max_episodes > 0 {
            Some(self.max_episodes as usize)
        } else {
            None
        }
    }

    /// Constructs [`ExperimentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ExperimentConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Where and under which names checkpoints are written.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CheckpointConfig {
    /// Base directory of checkpoints.
    pub save_dir: PathBuf,

    /// Index of the hyperparameter setting in a sweep.
    pub sweep_index: usize,

    /// Name of the environment, part of the file name.
    pub env_name: String,

    /// Name of the agent, part of the file name.
    pub agent_name: String,
}

impl CheckpointConfig {
    /// Constructs a [`CheckpointConfig`].
    pub fn new(
        save_dir: impl Into<PathBuf>,
        sweep_index: usize,
        env_name: impl Into<String>,
        agent_name: impl Into<String>,
    ) -> Self {
        Self {
            save_dir: save_dir.into(),
            sweep_index,
            env_name: env_name.into(),
            agent_name: agent_name.into(),
        }
    }

    /// Path of the checkpoint written at `timesteps` elapsed steps.
    ///
    /// `<save_dir>/<timesteps>/<env_name>_<agent_name>_data_<sweep_index>.json`
    pub fn path(&self, timesteps: usize) -> PathBuf {
        self.save_dir.join(timesteps.to_string()).join(format!(
            "{}_{}_data_{}.json",
            self.env_name, self.agent_name, self.sweep_index
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_experiment_config() -> Result<()> {
        let config = ExperimentConfig::default()
            .total_timesteps(5000)
            .eval_interval_timesteps(500)
            .checkpoint_interval(1000)
            .max_episodes(20)
            .budget_policy(BudgetPolicy::FinishEpisode);

        let dir = TempDir::new("experiment_config")?;
        let path = dir.path().join("experiment_config.yaml");
        config.save(&path)?;
        let config_ = ExperimentConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_steps_to_save_alias() -> Result<()> {
        let yaml = "---
eval_episodes: 3
total_timesteps: 100
eval_interval_timesteps: 10
steps_to_save: 50
max_episodes: 0
budget_policy: CutEpisode
contradiction_policy: Fail
seed: 7
";
        let config: ExperimentConfig = serde_yaml::from_str(yaml)?;
        assert_eq!(config.checkpoint_interval, 50);
        assert_eq!(config.contradiction_policy, ContradictionPolicy::Fail);
        assert_eq!(config.episode_cap(), None);
        Ok(())
    }

    #[test]
    fn test_checkpoint_path() {
        let config = CheckpointConfig::new("/tmp/results", 3, "Pendulum", "SAC");
        assert_eq!(
            config.path(1200),
            PathBuf::from("/tmp/results/1200/Pendulum_SAC_data_3.json")
        );
    }
}
