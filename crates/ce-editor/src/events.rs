// events.rs — Editor events and notification dispatch.
//
// The editor emits an event whenever something reaches the backend or the
// launch flow moves. Sinks (a JSONL log, a UI toast bridge) subscribe;
// they observe only and cannot affect the save that produced the event.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::launch::LaunchState;

/// Events emitted by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EditorEvent {
    /// A draft was created ahead of an explicit save.
    DraftCreated {
        challenge_id: String,
        timestamp: DateTime<Utc>,
    },

    /// The record was persisted (auto-save or explicit submit).
    ChallengeSaved {
        challenge_id: String,
        status: String,
        saved_at: DateTime<Utc>,
    },

    /// A member was assigned to a role that had no assignment.
    ResourceAssigned {
        challenge_id: String,
        role: String,
        member_handle: String,
        timestamp: DateTime<Utc>,
    },

    /// A stale role assignment was replaced.
    ResourceReplaced {
        challenge_id: String,
        role: String,
        previous_handle: String,
        member_handle: String,
        timestamp: DateTime<Utc>,
    },

    /// A save failed and was recovered; the next edit retries.
    SaveFailed {
        operation: String,
        category: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// The launch workflow changed state.
    LaunchStateChanged {
        from: String,
        to: String,
        timestamp: DateTime<Utc>,
    },
}

impl EditorEvent {
    /// Get the event type name as a string.
    pub fn event_type(&self) -> &str {
        match self {
            EditorEvent::DraftCreated { .. } => "draft_created",
            EditorEvent::ChallengeSaved { .. } => "challenge_saved",
            EditorEvent::ResourceAssigned { .. } => "resource_assigned",
            EditorEvent::ResourceReplaced { .. } => "resource_replaced",
            EditorEvent::SaveFailed { .. } => "save_failed",
            EditorEvent::LaunchStateChanged { .. } => "launch_state_changed",
        }
    }

    pub fn launch_state_changed(from: &LaunchState, to: &LaunchState) -> Self {
        EditorEvent::LaunchStateChanged {
            from: from.to_string(),
            to: to.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn save_failed(operation: &str, category: &str, message: impl Into<String>) -> Self {
        EditorEvent::SaveFailed {
            operation: operation.to_string(),
            category: category.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Receives editor events. Sinks observe only; an error is logged by the
/// dispatcher and the save that produced the event carries on.
pub trait NotificationSink: Send + Sync {
    /// Whether this sink wants `event`. Defaults to every event.
    fn accepts(&self, _event: &EditorEvent) -> bool {
        true
    }

    fn send(&self, event: &EditorEvent) -> Result<(), EditorError>;
}

/// Appends events as JSON lines to a file.
///
/// The file is opened on the first event and the handle is kept. After a
/// failed write the handle is dropped and the next event reopens it.
pub struct LogSink {
    path: PathBuf,
    event_types: Option<Vec<String>>,
    file: Mutex<Option<File>>,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            event_types: None,
            file: Mutex::new(None),
        }
    }

    /// Only log events whose `event_type()` is listed.
    pub fn only(mut self, event_types: &[&str]) -> Self {
        self.event_types = Some(event_types.iter().map(|t| t.to_string()).collect());
        self
    }

    fn io_error(&self, source: std::io::Error) -> EditorError {
        EditorError::IoError {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn open(&self) -> Result<File, EditorError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| EditorError::IoError {
                path: parent.display().to_string(),
                source,
            })?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))
    }
}

impl NotificationSink for LogSink {
    fn accepts(&self, event: &EditorEvent) -> bool {
        self.event_types
            .as_ref()
            .map_or(true, |types| types.iter().any(|t| t == event.event_type()))
    }

    fn send(&self, event: &EditorEvent) -> Result<(), EditorError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut slot = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = match slot.take() {
            Some(file) => file,
            None => self.open()?,
        };
        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|source| self.io_error(source))?;
        *slot = Some(file);
        Ok(())
    }
}

/// Fans events out to every sink that accepts them.
#[derive(Default)]
pub struct EventDispatcher {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    /// Returns how many sinks took the event.
    pub fn dispatch(&self, event: &EditorEvent) -> usize {
        let mut delivered = 0;
        for sink in self.sinks.iter().filter(|sink| sink.accepts(event)) {
            match sink.send(event) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(event = event.event_type(), "notification sink error: {}", e),
            }
        }
        tracing::debug!(event = event.event_type(), delivered, "editor event");
        delivered
    }
}
