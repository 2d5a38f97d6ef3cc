//! Trait definitions for record sinks.

use crate::core::record::FileRecord;
use crate::error::StoreError;

/// Receives finished records from a scan.
///
/// Called once per file, from the scanning thread only. Implementations
/// replace any earlier record with the same path.
pub trait RecordSink {
    fn accept(&mut self, record: &FileRecord) -> Result<(), StoreError>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn accept(&mut self, record: &FileRecord) -> Result<(), StoreError> {
        (**self).accept(record)
    }
}
