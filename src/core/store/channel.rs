//! Sink that streams records to another thread.

use super::RecordSink;
use crate::core::record::FileRecord;
use crate::error::StoreError;
use crossbeam_channel::{bounded, Receiver, Sender};

/// Forwards every record into a bounded channel.
///
/// A full channel blocks the scan until the consumer catches up. A dropped
/// receiver fails the next `accept`, which stops the scan.
#[derive(Clone)]
pub struct ChannelSink {
    sender: Sender<FileRecord>,
}

impl RecordSink for ChannelSink {
    fn accept(&mut self, record: &FileRecord) -> Result<(), StoreError> {
        self.sender
            .send(record.clone())
            .map_err(|_| StoreError::ChannelClosed)
    }
}

/// Create a sink and the receiver that drains it
pub fn record_channel(capacity: usize) -> (ChannelSink, Receiver<FileRecord>) {
    let (sender, receiver) = bounded(capacity);
    (ChannelSink { sender }, receiver)
}
