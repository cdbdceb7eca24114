use crate::{
    error::HarnessError,
    experiment::{Clock, ExperimentConfig, HistorySeries},
    record::Record,
};
use anyhow::Result;
use chrono::prelude::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

/// Version of the layout of [`CheckpointRecord`].
pub const CHECKPOINT_SCHEMA_VERSION: u32 = 1;

/// Merges diagnostics of several sources in the given order.
///
/// When a key appears in more than one source, the value of the later source
/// is kept. The controller passes the agent first, then the training
/// environment, then the evaluation environment.
pub fn merge_diagnostics<I>(sources: I) -> Record
where
    I: IntoIterator<Item = Record>,
{
    sources
        .into_iter()
        .fold(Record::empty(), |merged, source| merged.merge(source))
}

/// Snapshot of the statistics of a run at a given timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// See [`CHECKPOINT_SCHEMA_VERSION`].
    pub schema_version: u32,

    /// Index of the hyperparameter setting in a sweep.
    pub sweep_index: usize,

    /// Name of the environment.
    pub env_name: String,

    /// Name of the agent.
    pub agent_name: String,

    /// Training timesteps at the time of the checkpoint.
    pub timesteps_elapsed: usize,

    /// When the record was built.
    pub saved_at: DateTime<Local>,

    /// Statistics of all episodes so far.
    pub history: HistorySeries,

    /// Training time in seconds.
    pub train_time: f64,

    /// Evaluation time in seconds.
    pub eval_time: f64,

    /// Completed training episodes.
    pub total_train_episodes: usize,

    /// Steps reporting both a terminal state and a step-limit truncation.
    pub contradictory_terminations: usize,

    /// Parameters of the agent.
    pub learned_params: Record,

    /// Merged diagnostics, see [`merge_diagnostics`].
    pub diagnostics: Record,

    /// Configuration of the run.
    pub config: ExperimentConfig,
}

impl CheckpointRecord {
    /// Builds a record from the current state of a run.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sweep_index: usize,
        env_name: impl Into<String>,
        agent_name: impl Into<String>,
        clock: &Clock,
        history: &HistorySeries,
        learned_params: Record,
        diagnostics: Record,
        config: &ExperimentConfig,
    ) -> Self {
        Self {
            schema_version: CHECKPOINT_SCHEMA_VERSION,
            sweep_index,
            env_name: env_name.into(),
            agent_name: agent_name.into(),
            timesteps_elapsed: clock.timesteps_elapsed(),
            saved_at: Local::now(),
            history: history.clone(),
            train_time: clock.train_time().as_secs_f64(),
            eval_time: clock.eval_time().as_secs_f64(),
            total_train_episodes: clock.train_episodes(),
            contradictory_terminations: clock.contradictory_terminations(),
            learned_params,
            diagnostics,
            config: config.clone(),
        }
    }

    /// Loads a record written by [`FileCheckpointer`](super::FileCheckpointer).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let record: Self = serde_json::from_reader(rdr)?;
        if record.schema_version != CHECKPOINT_SCHEMA_VERSION {
            return Err(HarnessError::UnsupportedSchemaVersion(record.schema_version).into());
        }
        Ok(record)
    }
}
