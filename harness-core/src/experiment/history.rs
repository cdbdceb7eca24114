//! Chronological series of episode statistics.
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRecord {
    /// Sum of rewards.
    pub ret: f32,

    /// Number of environment steps.
    pub steps: usize,

    /// Wall time of the episode.
    pub wall_time: Duration,
}

/// Statistics of training episodes and evaluation sessions in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    /// Return of each training episode.
    pub train_episode_returns: Vec<f32>,

    /// Length of each training episode.
    pub train_episode_steps: Vec<usize>,

    /// Return of each evaluation episode, all sessions concatenated.
    pub eval_episode_returns: Vec<f32>,

    /// Length of each evaluation episode, all sessions concatenated.
    pub eval_episode_steps: Vec<usize>,

    /// `timesteps_elapsed` at the start of each evaluation session.
    pub eval_timesteps: Vec<usize>,
}

impl HistorySeries {
    /// Appends a training episode.
    pub fn push_train(&mut self, episode: &EpisodeRecord) {
        self.train_episode_returns.push(episode.ret);
        self.train_episode_steps.push(episode.steps);
    }

    /// Appends an evaluation session started at `timesteps`.
    pub fn push_eval(&mut self, timesteps: usize, returns: &[f32], steps: &[usize]) {
        self.eval_timesteps.push(timesteps);
        self.eval_episode_returns.extend_from_slice(returns);
        self.eval_episode_steps.extend_from_slice(steps);
    }

    /// Number of evaluation sessions.
    pub fn eval_sessions(&self) -> usize {
        self.eval_timesteps.len()
    }

    /// Sum of the lengths of all training episodes.
    pub fn total_train_steps(&self) -> usize {
        self.train_episode_steps.iter().sum()
    }
}
