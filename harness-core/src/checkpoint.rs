//! Persisted snapshots of a run.
//!
//! A [`CheckpointRecord`] is built fresh every time a checkpoint is due and
//! handed to a [`Checkpointer`], which decides where it goes.
mod checkpointer;
mod record;
pub use checkpointer::{BufferedCheckpointer, Checkpointer, FileCheckpointer, NullCheckpointer};
pub use record::{merge_diagnostics, CheckpointRecord, CHECKPOINT_SCHEMA_VERSION};
