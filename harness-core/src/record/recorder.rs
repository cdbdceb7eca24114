use super::Record;
use std::{cell::RefCell, rc::Rc};

/// Writes a record to an output destination with [`Recorder::write`].
pub trait Recorder {
    /// Write a record to the [`Recorder`].
    fn write(&mut self, record: Record);
}

impl<T: Recorder> Recorder for Rc<RefCell<T>> {
    fn write(&mut self, record: Record) {
        self.borrow_mut().write(record);
    }
}
