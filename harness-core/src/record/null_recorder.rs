use super::{Record, Recorder};

/// A recorder that ignores any record.
#[derive(Default)]
pub struct NullRecorder {}

impl Recorder for NullRecorder {
    /// Discard the given record.
    fn write(&mut self, _record: Record) {}
}
