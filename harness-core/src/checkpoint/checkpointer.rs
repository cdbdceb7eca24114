use super::CheckpointRecord;
use crate::experiment::CheckpointConfig;
use anyhow::Result;
use log::info;
use std::{
    cell::RefCell,
    fs::{self, File},
    io::{BufWriter, Write},
    path::PathBuf,
    rc::Rc,
};

/// Destination of checkpoints.
pub trait Checkpointer {
    /// Persists a record. Errors are fatal to the run.
    fn save(&mut self, record: &CheckpointRecord) -> Result<()>;
}

/// A shared checkpointer, so the caller keeps access to it while a controller
/// owns a handle.
impl<T: Checkpointer> Checkpointer for Rc<RefCell<T>> {
    fn save(&mut self, record: &CheckpointRecord) -> Result<()> {
        self.borrow_mut().save(record)
    }
}

/// Writes each checkpoint as a JSON file.
///
/// See [`CheckpointConfig::path`] for the layout. A file of the same path is
/// overwritten.
pub struct FileCheckpointer {
    config: CheckpointConfig,
}

impl FileCheckpointer {
    /// Constructs a [`FileCheckpointer`].
    pub fn new(config: CheckpointConfig) -> Self {
        Self { config }
    }

    /// Path of the checkpoint at `timesteps`.
    pub fn path(&self, timesteps: usize) -> PathBuf {
        self.config.path(timesteps)
    }
}

impl Checkpointer for FileCheckpointer {
    fn save(&mut self, record: &CheckpointRecord) -> Result<()> {
        let path = self.path(record.timesteps_elapsed);
        if let Some(dir) = path.parent() {
            // Succeeds if the directory already exists.
            fs::create_dir_all(dir)?;
        }

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, record)?;
        writer.flush()?;
        info!("Saved checkpoint in {:?}", &path);
        Ok(())
    }
}

/// A checkpointer that discards every record.
#[derive(Default)]
pub struct NullCheckpointer {}

impl Checkpointer for NullCheckpointer {
    fn save(&mut self, _record: &CheckpointRecord) -> Result<()> {
        Ok(())
    }
}

/// Keeps checkpoints in memory.
#[derive(Default)]
pub struct BufferedCheckpointer {
    buf: Vec<CheckpointRecord>,
}

impl BufferedCheckpointer {
    /// Construct the checkpointer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the saved records in order.
    pub fn records(&self) -> &[CheckpointRecord] {
        &self.buf
    }
}

impl Checkpointer for BufferedCheckpointer {
    fn save(&mut self, record: &CheckpointRecord) -> Result<()> {
        self.buf.push(record.clone());
        Ok(())
    }
}
