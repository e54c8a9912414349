//! # ce-challenge
//!
//! The challenge record and everything that can be done to it without
//! touching the network.
//!
//! ## Key components
//!
//! - [`Challenge`] — the in-memory record, addressable by wire field name
//! - [`Intent`] / [`apply`] — pure edit applicators (old record in, new record out)
//! - [`is_valid`] — the gate in front of auto-save and launch
//! - [`PersistableChallenge`] — the allow-listed payload sent to the backend
//! - [`Metadata`] — read-only catalogs (types, timelines, phases, roles)
//! - [`Resource`] — copilot/reviewer role assignments

pub mod challenge;
pub mod currency;
pub mod error;
pub mod intent;
pub mod metadata;
pub mod projection;
pub mod resource;
pub mod validation;

pub use challenge::{Attachment, Challenge, Phase, Prize, PrizeSet, STATUS_ACTIVE, STATUS_DRAFT};
pub use error::ChallengeError;
pub use intent::{apply, AmountKind, Intent, PhaseUpdate, SelectOption};
pub use metadata::{Metadata, PhaseDefinition, ResourceRole, TimelineTemplate};
pub use projection::{DraftPlaceholders, PersistableChallenge, ProjectionContext};
pub use resource::{Resource, ResourcePayload, ROLE_COPILOT, ROLE_REVIEWER};
pub use validation::{is_valid, missing_fields};
