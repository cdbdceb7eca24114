//! Key-value records of values produced during a run.
//!
//! [`Record`] serves two purposes in this crate:
//!
//! * it is the opaque diagnostics mapping exposed by agents and environments
//!   and merged into checkpoints, and
//! * it is the unit written to a [`Recorder`] after every training episode and
//!   evaluation session.
//!
//! ```rust
//! use harness_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(3.0));
//! record.insert("return", RecordValue::Scalar(-12.5));
//! record.insert("obs", RecordValue::Array1(vec![0.1, 0.2]));
//! assert_eq!(record.get_scalar("return").unwrap(), -12.5);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
pub use storage::RecordStorage;
