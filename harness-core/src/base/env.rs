//! Environment.
use super::{Act, Obs, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents an environment, typically an MDP.
///
/// The training and the evaluation environment of an experiment are two
/// separate instances of the same type.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode, returning the initial observation and
    /// environment-specific information.
    fn reset(&mut self) -> Result<(Self::Obs, Record)>;

    /// Performs an environment step.
    ///
    /// The returned [`Record`] holds per-step information.
    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;

    /// The maximum number of steps of an episode, if the environment has one.
    ///
    /// Episodes reaching this number of steps without a terminal state are
    /// truncated by the runner.
    fn max_episode_steps(&self) -> Option<usize> {
        None
    }

    /// Diagnostic values accumulated by the environment, merged into checkpoints.
    fn diagnostics(&self) -> Record {
        Record::empty()
    }
}
