#![warn(missing_docs)]
//! An experiment harness for reinforcement learning agents.
//!
//! [`ExperimentController`] drives an [`Agent`] on a training [`Env`] one
//! episode at a time, evaluates it on a separate environment instance at a
//! fixed timestep interval, and writes [`CheckpointRecord`]s of the collected
//! statistics at another fixed interval.
//!
//! [`CheckpointRecord`]: checkpoint::CheckpointRecord
pub mod checkpoint;
pub mod dummy;
pub mod error;
pub mod evaluator;
pub mod record;

mod base;
pub use base::{Act, Agent, Env, Obs, Policy, Step, Transition};

mod episode;
pub use episode::TrainEpisodeRunner;

mod experiment;
pub use experiment::{
    BudgetPolicy, CheckpointConfig, Clock, ContradictionPolicy, EpisodeRecord, ExperimentConfig,
    ExperimentController, ExperimentResult, HistorySeries, Phase,
};
