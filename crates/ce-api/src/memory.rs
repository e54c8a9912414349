//! In-process backend that records every call

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use ce_challenge::{PersistableChallenge, Resource, ResourcePayload};
use uuid::Uuid;

use crate::client::{ChallengeApi, ChallengeRecord};
use crate::error::{ApiError, Result};

/// The four collaborator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    CreateChallenge,
    UpdateChallenge,
    CreateResource,
    DeleteResource,
}

/// One outbound call, as the backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    CreateChallenge(PersistableChallenge),
    UpdateChallenge {
        challenge_id: String,
        payload: PersistableChallenge,
    },
    CreateResource(ResourcePayload),
    DeleteResource(ResourcePayload),
}

impl ApiCall {
    pub fn operation(&self) -> ApiOperation {
        match self {
            ApiCall::CreateChallenge(_) => ApiOperation::CreateChallenge,
            ApiCall::UpdateChallenge { .. } => ApiOperation::UpdateChallenge,
            ApiCall::CreateResource(_) => ApiOperation::CreateResource,
            ApiCall::DeleteResource(_) => ApiOperation::DeleteResource,
        }
    }
}

#[derive(Default)]
struct MemoryState {
    challenges: BTreeMap<String, PersistableChallenge>,
    resources: Vec<Resource>,
    calls: Vec<ApiCall>,
    failures: HashMap<ApiOperation, VecDeque<ApiError>>,
}

/// Backend kept in memory.
///
/// Used for offline runs (`ce launch --dry-run`) and as the collaborator
/// in editor tests: it records calls in order, can be told to fail the
/// next call of a given kind, and can hold every call for a fixed latency
/// so overlapping saves are observable.
pub struct MemoryChallengeApi {
    state: Mutex<MemoryState>,
    latency: Option<Duration>,
}

impl MemoryChallengeApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            latency: None,
        }
    }

    /// Hold every call for `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Start with an existing role assignment.
    pub fn with_resource(self, resource: Resource) -> Self {
        self.state().resources.push(resource);
        self
    }

    /// Make the next call of kind `operation` fail with `error`.
    pub fn fail_next(&self, operation: ApiOperation, error: ApiError) {
        self.state()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state().calls.clone()
    }

    /// Calls of one kind, in order.
    pub fn calls_of(&self, operation: ApiOperation) -> Vec<ApiCall> {
        self.state()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .cloned()
            .collect()
    }

    /// Current role assignments.
    pub fn resources(&self) -> Vec<Resource> {
        self.state().resources.clone()
    }

    /// Last stored payload for a challenge.
    pub fn challenge(&self, challenge_id: &str) -> Option<PersistableChallenge> {
        self.state().challenges.get(challenge_id).cloned()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call, wait out the latency, then pop an injected failure.
    async fn receive(&self, call: ApiCall) -> Result<()> {
        let operation = call.operation();
        self.state().calls.push(call);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let failure = self
            .state()
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for MemoryChallengeApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChallengeApi for MemoryChallengeApi {
    async fn create_challenge(&self, payload: &PersistableChallenge) -> Result<ChallengeRecord> {
        self.receive(ApiCall::CreateChallenge(payload.clone())).await?;
        let id = Uuid::new_v4().to_string();
        tracing::debug!("MemoryChallengeApi: created challenge {}", id);
        self.state().challenges.insert(id.clone(), payload.clone());
        Ok(ChallengeRecord::new(id))
    }

    async fn update_challenge(
        &self,
        payload: &PersistableChallenge,
        challenge_id: &str,
    ) -> Result<ChallengeRecord> {
        self.receive(ApiCall::UpdateChallenge {
            challenge_id: challenge_id.to_string(),
            payload: payload.clone(),
        })
        .await?;
        self.state()
            .challenges
            .insert(challenge_id.to_string(), payload.clone());
        Ok(ChallengeRecord::new(challenge_id))
    }

    async fn create_resource(&self, payload: &ResourcePayload) -> Result<Resource> {
        self.receive(ApiCall::CreateResource(payload.clone())).await?;
        let resource = payload.clone().into_resource(Some(Uuid::new_v4().to_string()));
        self.state().resources.push(resource.clone());
        Ok(resource)
    }

    async fn delete_resource(&self, payload: &ResourcePayload) -> Result<()> {
        self.receive(ApiCall::DeleteResource(payload.clone())).await?;
        let mut state = self.state();
        let before = state.resources.len();
        state.resources.retain(|resource| resource.payload() != *payload);
        if state.resources.len() == before {
            return Err(ApiError::NotFound(format!(
                "resource {} for {}",
                payload.role_id, payload.member_handle
            )));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
