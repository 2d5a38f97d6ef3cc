//! # Events Module
//!
//! Progress reporting for scans.
//!
//! ## Design
//! The scanner emits lifecycle events through a channel so any front end
//! can subscribe. Records themselves travel through a
//! [`RecordSink`](crate::core::store::RecordSink); use
//! [`record_channel`](crate::core::store::record_channel) to consume them
//! as a stream instead.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let ScanEvent::Progress(p) = event {
//!             println!("{} files", p.files_processed);
//!         }
//!     }
//! });
//!
//! scanner.scan_with_events(&root, &mut sink, &cancel, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
