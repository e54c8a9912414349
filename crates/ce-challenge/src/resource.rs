// resource.rs — Role assignments attached to a challenge.

use serde::{Deserialize, Serialize};

/// Role name of the copilot assignment.
pub const ROLE_COPILOT: &str = "Copilot";

/// Role name of the reviewer assignment.
pub const ROLE_REVIEWER: &str = "Reviewer";

/// A link between a challenge, a role and a member handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub challenge_id: String,

    pub member_handle: String,

    pub role_id: String,
}

impl Resource {
    /// The fields the create/delete endpoints key on.
    pub fn payload(&self) -> ResourcePayload {
        ResourcePayload {
            challenge_id: self.challenge_id.clone(),
            member_handle: self.member_handle.clone(),
            role_id: self.role_id.clone(),
        }
    }
}

/// Body of a resource create or delete call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePayload {
    pub challenge_id: String,
    pub member_handle: String,
    pub role_id: String,
}

impl ResourcePayload {
    pub fn new(
        challenge_id: impl Into<String>,
        member_handle: impl Into<String>,
        role_id: impl Into<String>,
    ) -> Self {
        Self {
            challenge_id: challenge_id.into(),
            member_handle: member_handle.into(),
            role_id: role_id.into(),
        }
    }

    pub fn into_resource(self, id: Option<String>) -> Resource {
        Resource {
            id,
            challenge_id: self.challenge_id,
            member_handle: self.member_handle,
            role_id: self.role_id,
        }
    }
}
