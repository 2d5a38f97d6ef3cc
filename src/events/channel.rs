//! Scan event channel built on crossbeam-channel.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::ScanEvent;

/// Sending half handed to the scanner.
///
/// Cheap to clone. Events sent after the receiver is gone are dropped,
/// so progress reporting never affects the scan itself.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<ScanEvent>,
}

impl EventSender {
    /// Send an event, blocking only if a bounded channel is full.
    pub fn send(&self, event: ScanEvent) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half used by front ends.
pub struct EventReceiver {
    inner: Receiver<ScanEvent>,
}

impl EventReceiver {
    /// Block until the next event arrives or every sender is dropped
    pub fn recv(&self) -> Option<ScanEvent> {
        self.inner.recv().ok()
    }

    /// Take an event if one is waiting
    pub fn try_recv(&self) -> Option<ScanEvent> {
        self.inner.try_recv().ok()
    }

    /// Iterate until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = ScanEvent> + '_ {
        self.inner.iter()
    }
}

/// Constructors for scan event channels.
pub struct EventChannel;

impl EventChannel {
    /// Create an unbounded channel.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }

    /// Create a bounded channel; a slow consumer then throttles the scanner.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender whose receiver is already gone.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ScanProgress;
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn events_cross_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(ScanEvent::Progress(ScanProgress {
                files_processed: 3,
                current_path: PathBuf::from("/media/a.jpg"),
                corrupted: false,
                usable: true,
            }));
        });
        handle.join().unwrap();

        match receiver.recv() {
            Some(ScanEvent::Progress(p)) => assert_eq!(p.files_processed, 3),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn null_sender_swallows_events() {
        let sender = null_sender();
        sender.send(ScanEvent::Started {
            root: PathBuf::from("/media"),
        });
    }

    #[test]
    fn bounded_channel_holds_capacity() {
        let (sender, receiver) = EventChannel::bounded(2);
        sender.send(ScanEvent::Cancelled { files_processed: 0 });
        sender.send(ScanEvent::Cancelled { files_processed: 1 });

        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_none());
    }
}
