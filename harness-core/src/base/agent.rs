//! Agent.
use super::{Env, Policy, Transition};
use crate::record::Record;
use anyhow::Result;

/// Represents a trainable policy on an environment.
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Called at the beginning of every training episode.
    fn reset(&mut self) {}

    /// Performs an update with the latest transition.
    fn update(&mut self, transition: Transition<E>) -> Result<()>;

    /// Returns the learned parameters of the agent.
    fn parameters(&self) -> Record;

    /// Diagnostic values accumulated by the agent, merged into checkpoints.
    fn diagnostics(&self) -> Record {
        Record::empty()
    }

    /// Number of evaluation steps over which visited observations are
    /// sampled after each evaluation session. `None` disables sampling.
    fn eval_trajectory_steps(&self) -> Option<usize> {
        None
    }

    /// Receives a sampled evaluation trajectory.
    fn push_eval_trajectory(&mut self, _states: Vec<E::Obs>) -> Result<()> {
        Ok(())
    }
}
