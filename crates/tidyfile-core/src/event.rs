//! Progress events emitted by streaming commands.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::record::{DuplicateReport, IndexReport};

/// Stage of a streaming command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// Enumerating files.
    Scanning,
    /// Reading per-file metadata (and optionally hashing).
    Indexing,
    /// Hashing duplicate candidates.
    Hashing,
}

/// Final payload carried by a `complete` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamSummary {
    Index(IndexReport),
    Duplicates(DuplicateReport),
}

/// One incremental event from a streaming command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A unit of work finished.
    Progress {
        phase: Phase,
        current: u64,
        total: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current_file: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The command finished.
    Complete { summary: StreamSummary },
    /// The command stopped early.
    Error { message: String },
}

impl ProgressEvent {
    /// A progress event without file or message.
    pub fn progress(phase: Phase, current: u64, total: u64) -> Self {
        Self::Progress {
            phase,
            current,
            total,
            current_file: None,
            message: None,
        }
    }

    /// Attach the name of the file just processed.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        if let Self::Progress { current_file, .. } = &mut self {
            *current_file = Some(file.into());
        }
        self
    }

    /// Attach a human-readable message.
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        if let Self::Progress { message, .. } = &mut self {
            *message = Some(text.into());
        }
        self
    }

    pub fn complete(summary: StreamSummary) -> Self {
        Self::Complete { summary }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Phase of a progress event.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Progress { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_serializes_with_type_tag() {
        let event = ProgressEvent::progress(Phase::Indexing, 3, 10).with_file("a.txt");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["phase"], "indexing");
        assert_eq!(json["current_file"], "a.txt");
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_complete_is_terminal() {
        let event = ProgressEvent::complete(StreamSummary::Index(IndexReport::default()));
        assert!(event.is_terminal());
        assert!(event.phase().is_none());

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "complete");
        assert_eq!(json["summary"]["total_files"], 0);
    }

    #[test]
    fn test_with_file_ignored_on_error() {
        let event = ProgressEvent::error("boom").with_file("x");
        assert!(matches!(event, ProgressEvent::Error { ref message } if message == "boom"));
    }
}
