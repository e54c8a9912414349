//! # ce-editor
//!
//! Auto-persisting form-state controller for challenge records.
//!
//! The editor owns the record being edited, applies edit intents to it,
//! and keeps a remote copy eventually consistent: a draft is created as
//! soon as a new record has a phase, later edits are coalesced into
//! debounced full updates, and the copilot/reviewer role assignments are
//! reconciled after every successful save.
//!
//! ## Key components
//!
//! - [`ChallengeEditor`] — field value store, draft reconciler and debounce scheduler
//! - [`resolve_challenge_id`] — explicit id > draft id > query parameter
//! - [`sync_role`] — per-role resource reconciliation
//! - [`LaunchState`] — the confirm-then-submit workflow
//! - [`EditorEvent`] / [`EventDispatcher`] — notifications for sinks
//! - [`EditorConfig`] — `.ce/editor.toml`

pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod identity;
pub mod launch;
pub mod navigation;
pub mod resources;

pub use config::{AutosaveConfig, EditorConfig, DEFAULT_CONFIG_PATH};
pub use editor::{ChallengeEditor, DraftRef, EditorContext, EditorSnapshot, SaveOutcome, SkipReason};
pub use error::EditorError;
pub use events::{EditorEvent, EventDispatcher, LogSink, NotificationSink};
pub use identity::{resolve_challenge_id, CHALLENGE_ID_PARAM};
pub use launch::LaunchState;
pub use navigation::{MemoryNavigator, Navigator};
pub use resources::{sync_role, SyncAction};
