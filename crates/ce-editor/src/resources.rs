// resources.rs — Keeps copilot/reviewer role assignments in step with the record.
//
// Per role: look the role up in the catalog (missing role is a hard
// error), find the known assignment for it, delete it when its handle is
// stale, then create the new one. An empty local handle does nothing,
// including leaving an existing assignment alone.

use ce_api::ChallengeApi;
use ce_challenge::{Metadata, Resource, ResourcePayload};

use crate::error::EditorError;

/// What a role sync did remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// No remote call was needed.
    Unchanged,

    /// A new assignment was created; none existed before.
    Created(Resource),

    /// A stale assignment was deleted and a new one created.
    Replaced { removed: Resource, created: Resource },
}

/// Reconcile one role's remote assignment with the local `handle`.
///
/// `known` is the caller's view of the remote assignments for this
/// challenge. It is updated after every successful call, so a failure
/// part-way leaves it matching what the backend actually holds.
pub async fn sync_role(
    api: &dyn ChallengeApi,
    metadata: &Metadata,
    role_name: &str,
    challenge_id: &str,
    handle: Option<&str>,
    known: &mut Vec<Resource>,
) -> Result<SyncAction, EditorError> {
    let handle = match handle {
        Some(handle) if !handle.is_empty() => handle,
        _ => return Ok(SyncAction::Unchanged),
    };

    let role = metadata
        .role_by_name(role_name)
        .ok_or_else(|| EditorError::RoleNotFound(role_name.to_string()))?;

    let existing = known
        .iter()
        .find(|resource| resource.role_id == role.id)
        .cloned();

    let removed = match existing {
        Some(resource) if resource.member_handle == handle => {
            return Ok(SyncAction::Unchanged);
        }
        Some(resource) => {
            tracing::info!(
                challenge_id = %challenge_id,
                role = %role_name,
                "removing {} from role",
                resource.member_handle
            );
            api.delete_resource(&resource.payload()).await?;
            known.retain(|other| other != &resource);
            Some(resource)
        }
        None => None,
    };

    let payload = ResourcePayload::new(challenge_id, handle, role.id.clone());
    let created = api.create_resource(&payload).await?;
    tracing::info!(
        challenge_id = %challenge_id,
        role = %role_name,
        "assigned {} to role",
        handle
    );
    known.push(created.clone());

    Ok(match removed {
        Some(removed) => SyncAction::Replaced { removed, created },
        None => SyncAction::Created(created),
    })
}
