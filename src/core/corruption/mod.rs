//! # Corruption Module
//!
//! Severity classification for damaged media.
//!
//! | Severity | Meaning |
//! |----------|---------|
//! | Soft     | Data truncated or inconsistent, metadata still usable |
//! | Hard     | File unreadable for this modality, extraction stops |

use serde::{Deserialize, Serialize};

/// How badly a degradation event affects a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Soft,
    Hard,
}

/// Message fragments of recoverable decoder failures
const SOFT_PATTERNS: &[&str] = &[
    "truncated",
    "broken data stream",
    "wrong number of bytes",
    "incomplete jpeg",
    "premature end",
    "unexpected end",
    "failed to fill whole buffer",
];

/// Classify a decoder error message.
///
/// Unknown messages are treated as hard: an error we cannot explain is
/// not trusted to have left usable data behind.
pub fn classify_decode_error(message: &str) -> Severity {
    let message = message.to_lowercase();
    if SOFT_PATTERNS.iter().any(|p| message.contains(p)) {
        Severity::Soft
    } else {
        Severity::Hard
    }
}

/// Accumulated corruption state of one extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorruptionVerdict {
    /// Any soft or hard event happened
    pub corrupted: bool,
    /// No hard event happened
    pub usable: bool,
    /// First message recorded
    pub error: Option<String>,
}

impl Default for CorruptionVerdict {
    fn default() -> Self {
        Self::clean()
    }
}

impl CorruptionVerdict {
    pub fn clean() -> Self {
        Self {
            corrupted: false,
            usable: true,
            error: None,
        }
    }

    pub fn hard(message: impl Into<String>) -> Self {
        let mut verdict = Self::clean();
        verdict.record(Severity::Hard, message);
        verdict
    }

    /// Fold an event into the verdict
    pub fn record(&mut self, severity: Severity, message: impl Into<String>) {
        self.corrupted = true;
        if severity == Severity::Hard {
            self.usable = false;
        }
        if self.error.is_none() {
            self.error = Some(message.into());
        }
    }

    pub fn is_hard(&self) -> bool {
        !self.usable
    }
}

/// Metadata produced by an extractor together with its verdict
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub metadata: Option<T>,
    pub verdict: CorruptionVerdict,
}

impl<T> Extraction<T> {
    pub fn new(metadata: Option<T>, verdict: CorruptionVerdict) -> Self {
        Self { metadata, verdict }
    }

    /// Nothing extracted, hard failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            metadata: None,
            verdict: CorruptionVerdict::hard(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_is_soft() {
        assert_eq!(
            classify_decode_error("image file is truncated (3 bytes not processed)"),
            Severity::Soft
        );
        assert_eq!(classify_decode_error("Premature end of JPEG file"), Severity::Soft);
    }

    #[test]
    fn unidentifiable_is_hard() {
        assert_eq!(
            classify_decode_error("cannot identify image file '/x.jpg'"),
            Severity::Hard
        );
        assert_eq!(classify_decode_error("Invalid PNG signature"), Severity::Hard);
    }

    #[test]
    fn unknown_message_is_hard() {
        assert_eq!(classify_decode_error("something odd"), Severity::Hard);
    }

    #[test]
    fn soft_event_keeps_usable() {
        let mut verdict = CorruptionVerdict::clean();
        verdict.record(Severity::Soft, "truncated");
        assert!(verdict.corrupted);
        assert!(verdict.usable);
    }

    #[test]
    fn hard_event_wins_over_soft() {
        let mut verdict = CorruptionVerdict::clean();
        verdict.record(Severity::Soft, "first");
        verdict.record(Severity::Hard, "second");
        assert!(verdict.corrupted);
        assert!(!verdict.usable);
        assert_eq!(verdict.error.as_deref(), Some("first"));
    }
}
