//! Core ChallengeApi trait and response types

use async_trait::async_trait;
use ce_challenge::{PersistableChallenge, Resource, ResourcePayload};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// A challenge as returned by a create or update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeRecord {
    pub id: String,

    /// Everything else the backend echoes back.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ChallengeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }
}

/// The backend operations the editor consumes.
///
/// Creates are not assumed to be idempotent; callers keep at most one
/// outbound save in flight instead of relying on safe retries.
#[async_trait]
pub trait ChallengeApi: Send + Sync {
    /// Create a new challenge and return its remote record.
    async fn create_challenge(&self, payload: &PersistableChallenge) -> Result<ChallengeRecord>;

    /// Replace an existing challenge.
    async fn update_challenge(
        &self,
        payload: &PersistableChallenge,
        challenge_id: &str,
    ) -> Result<ChallengeRecord>;

    /// Assign a member to a role on a challenge.
    async fn create_resource(&self, payload: &ResourcePayload) -> Result<Resource>;

    /// Remove a role assignment.
    async fn delete_resource(&self, payload: &ResourcePayload) -> Result<()>;

    /// Backend display name (for logs and CLI output)
    fn name(&self) -> &str;
}
