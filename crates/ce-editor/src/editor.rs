// editor.rs — The auto-persisting form-state controller.
//
// `ChallengeEditor` owns the record being edited and keeps a remote copy
// eventually consistent with it:
//
//   edit(intent) ─▶ apply() ─▶ new record
//                      │
//                      ├─▶ create_draft_if_needed()   (phase/other edits)
//                      └─▶ debounce ─▶ auto_update()  (trailing edge)
//
// At most one outbound save is in flight. The flag is owned by
// `SavingGuard`, so every exit path releases it. The state mutex is never
// held across an await.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ce_api::{ApiError, ChallengeApi};
use ce_challenge::{
    apply, is_valid, missing_fields, Attachment, Challenge, Intent, Metadata,
    PersistableChallenge, ProjectionContext, Resource, ROLE_COPILOT, ROLE_REVIEWER,
    STATUS_ACTIVE, STATUS_DRAFT,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::events::{EditorEvent, EventDispatcher};
use crate::identity::{resolve_challenge_id, CHALLENGE_ID_PARAM};
use crate::launch::LaunchState;
use crate::navigation::Navigator;
use crate::resources::{self, SyncAction};

/// What the embedding layer supplies when the editor is mounted or when
/// new props arrive.
#[derive(Debug, Clone, Default)]
pub struct EditorContext {
    /// Authoring a brand-new challenge (as opposed to editing one).
    pub is_new: bool,

    /// Remote id of the challenge being edited, if known up front.
    pub challenge_id: Option<String>,

    pub project_id: String,

    pub metadata: Metadata,

    /// Fetched challenge details (existing challenges only).
    pub details: Option<Value>,

    /// Uploaded attachments (existing challenges only).
    pub attachments: Vec<Attachment>,

    /// Current role assignments of the challenge.
    pub resources: Vec<Resource>,
}

impl EditorContext {
    pub fn new_challenge(project_id: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            is_new: true,
            project_id: project_id.into(),
            metadata,
            ..Self::default()
        }
    }

    pub fn existing(
        challenge_id: impl Into<String>,
        project_id: impl Into<String>,
        metadata: Metadata,
        details: Value,
    ) -> Self {
        Self {
            is_new: false,
            challenge_id: Some(challenge_id.into()),
            project_id: project_id.into(),
            metadata,
            details: Some(details),
            ..Self::default()
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_resources(mut self, resources: Vec<Resource>) -> Self {
        self.resources = resources;
        self
    }
}

/// A remote id created speculatively, before the user explicitly saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftRef {
    pub id: Option<String>,
}

/// Result of one reconciliation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// A new remote challenge was created with this id.
    Created(String),

    /// The remote challenge with this id was replaced.
    Updated(String),

    /// Nothing was sent.
    Skipped(SkipReason),

    /// The backend call failed. Local state is untouched and the next
    /// qualifying edit retries; the failure is not surfaced further.
    Recovered(ApiError),
}

impl SaveOutcome {
    pub fn challenge_id(&self) -> Option<&str> {
        match self {
            SaveOutcome::Created(id) | SaveOutcome::Updated(id) => Some(id),
            _ => None,
        }
    }
}

/// Why a save attempt sent nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another save is in flight.
    AlreadySaving,

    /// Draft creation only applies to new challenges.
    NotNew,

    /// A remote id already exists, so there is no draft to create.
    HasRemoteId,

    /// Draft creation needs at least one phase.
    NoPhases,

    /// Editing an existing challenge whose id is unknown.
    NoRemoteId,

    /// The record does not pass validation.
    Invalid,
}

/// Read-only view of the editor for display.
#[derive(Debug, Clone, Serialize)]
pub struct EditorSnapshot {
    pub challenge: Challenge,
    pub challenge_id: Option<String>,
    pub is_new: bool,
    pub is_saving: bool,
    /// The last validation run failed. Cleared by the next passing run.
    pub has_validation_errors: bool,
    pub launch: LaunchState,
    pub last_saved: Option<DateTime<Utc>>,
    pub timeline_template_id: Option<String>,
    pub resources: Vec<Resource>,
}

struct EditorState {
    is_new: bool,
    explicit_id: Option<String>,
    project_id: String,
    metadata: Arc<Metadata>,
    challenge: Challenge,
    draft: DraftRef,
    timeline_template_id: Option<String>,
    resources: Vec<Resource>,
    is_saving: bool,
    has_validation_errors: bool,
    resave_pending: bool,
    /// Bumped on every auto-savable edit; a debounce firing whose number
    /// is no longer current is discarded.
    edit_seq: u64,
    /// Bumped when a reseed switches challenges; saves started before
    /// that do not write back.
    generation: u64,
    launch: LaunchState,
    last_saved: Option<DateTime<Utc>>,
}

struct Inner {
    state: Mutex<EditorState>,
    api: Arc<dyn ChallengeApi>,
    navigator: Arc<dyn Navigator>,
    config: EditorConfig,
    events: EventDispatcher,
}

/// Holds the in-flight flag; dropping it clears the flag.
struct SavingGuard {
    inner: Arc<Inner>,
}

impl SavingGuard {
    fn acquire(inner: &Arc<Inner>, state: &mut EditorState) -> Option<Self> {
        if state.is_saving {
            return None;
        }
        state.is_saving = true;
        Some(Self {
            inner: Arc::clone(inner),
        })
    }
}

impl Drop for SavingGuard {
    fn drop(&mut self) {
        lock(&self.inner.state).is_saving = false;
    }
}

/// Everything a save needs, captured while the state lock is held.
struct PreparedSave {
    generation: u64,
    payload: PersistableChallenge,
    challenge_id: Option<String>,
    copilot: Option<String>,
    reviewer: Option<String>,
    known: Vec<Resource>,
    metadata: Arc<Metadata>,
    absorb: bool,
}

enum Plan {
    Skip(SkipReason),
    CreateDraft,
    Save(SavingGuard, PreparedSave),
}

/// The challenge editor.
///
/// Cheap to clone; clones share the same record. Background saves are
/// spawned on the current Tokio runtime.
#[derive(Clone)]
pub struct ChallengeEditor {
    inner: Arc<Inner>,
}

impl ChallengeEditor {
    /// Mount with the default config and no event sinks.
    pub fn new(
        ctx: EditorContext,
        api: Arc<dyn ChallengeApi>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::with_config(ctx, api, navigator, EditorConfig::default(), EventDispatcher::new())
    }

    pub fn with_config(
        ctx: EditorContext,
        api: Arc<dyn ChallengeApi>,
        navigator: Arc<dyn Navigator>,
        config: EditorConfig,
        events: EventDispatcher,
    ) -> Self {
        let state = seed(None, ctx, Utc::now());
        tracing::debug!(
            is_new = state.is_new,
            backend = api.name(),
            "challenge editor mounted"
        );
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                api,
                navigator,
                config,
                events,
            }),
        }
    }

    /// Re-run seeding because new props arrived.
    ///
    /// Staying on the same challenge keeps local edits to copilot and
    /// reviewer, the draft reference and the selected timeline. The
    /// launch workflow always returns to editing.
    pub fn reset(&self, ctx: EditorContext) {
        let event = {
            let mut state = self.state();
            let next = seed(Some(&*state), ctx, Utc::now());
            let from = state.launch.clone();
            *state = next;
            (from != LaunchState::Editing)
                .then(|| EditorEvent::launch_state_changed(&from, &LaunchState::Editing))
        };
        if let Some(event) = event {
            self.inner.events.dispatch(&event);
        }
    }

    /// Apply one edit and schedule whatever persistence it calls for.
    pub fn edit(&self, intent: Intent) {
        let auto_save = intent.is_auto_savable();
        let create_draft = intent.may_create_draft();
        {
            let mut state = self.state();
            let next = apply(&state.challenge, intent);
            state.challenge = next;
        }

        if create_draft {
            let editor = self.clone();
            self.spawn(async move {
                match editor.create_draft_if_needed().await {
                    Ok(outcome) => tracing::debug!(?outcome, "draft check finished"),
                    Err(e) => tracing::error!("draft creation failed: {}", e),
                }
            });
        }
        if auto_save {
            self.schedule_autosave();
        }
    }

    /// Pick a timeline template: its phases replace the current ones and
    /// it becomes the template sent with every save. Unknown ids are
    /// ignored.
    pub fn select_timeline(&self, template_id: &str) -> bool {
        let phases = {
            let mut state = self.state();
            let phases = match state.metadata.timeline_template(template_id) {
                Some(template) => state.metadata.phases_for_template(template),
                None => {
                    tracing::warn!("unknown timeline template: {}", template_id);
                    return false;
                }
            };
            state.timeline_template_id = Some(template_id.to_string());
            phases
        };
        self.edit(Intent::SetPhases(phases));
        true
    }

    /// Run the validation gate, marking the record on failure so field
    /// errors can be shown.
    pub fn validate(&self) -> bool {
        let mut state = self.state();
        passes_validation(&mut state)
    }

    /// Draft creation path.
    ///
    /// Creates the remote challenge early, with placeholders for every
    /// required field still empty, once a new record has a phase.
    pub async fn create_draft_if_needed(&self) -> Result<SaveOutcome, EditorError> {
        let outcome = self.create_draft().await;
        self.after_save();
        outcome
    }

    /// Update path, also what a debounce firing runs.
    ///
    /// Without a remote id a new record falls through to draft creation.
    /// If a save is already in flight the attempt is noted and re-armed
    /// once that save finishes.
    pub async fn auto_update(&self) -> Result<SaveOutcome, EditorError> {
        let plan = {
            let mut state = self.state();
            let challenge_id = self.resolve_id(&state);
            if state.is_saving {
                state.resave_pending = true;
                Plan::Skip(SkipReason::AlreadySaving)
            } else {
                match challenge_id {
                    None if state.is_new => Plan::CreateDraft,
                    None => Plan::Skip(SkipReason::NoRemoteId),
                    Some(_) if !is_valid(&state.challenge) => Plan::Skip(SkipReason::Invalid),
                    Some(id) => {
                        let status = state.challenge.status_or_draft().to_string();
                        self.prepare(&mut state, Some(id), &status, false)
                    }
                }
            }
        };
        let outcome = self.run(plan).await;
        self.after_save();
        outcome
    }

    /// Explicit save with `status` ("Draft" to save, "Active" to launch).
    ///
    /// Creates the challenge when no remote id exists yet. On success the
    /// record takes on the submitted status and prize values.
    pub async fn submit(&self, status: &str) -> Result<SaveOutcome, EditorError> {
        let plan = {
            let mut state = self.state();
            if state.is_saving {
                Plan::Skip(SkipReason::AlreadySaving)
            } else if passes_validation(&mut state) {
                let challenge_id = self.resolve_id(&state);
                self.prepare(&mut state, challenge_id, status, true)
            } else {
                tracing::info!(
                    missing = ?missing_fields(&state.challenge),
                    "submit blocked by validation"
                );
                Plan::Skip(SkipReason::Invalid)
            }
        };
        let outcome = self.run(plan).await;
        self.after_save();
        outcome
    }

    /// `editing → confirming`, gated by validation. A failing record stays
    /// in `editing` with its `submitTriggered` flag set.
    pub fn request_launch(&self) -> Result<LaunchState, EditorError> {
        let event = {
            let mut state = self.state();
            if !state.launch.can_transition_to(&LaunchState::Confirming) {
                return Err(invalid_transition(&state.launch, &LaunchState::Confirming));
            }
            if !passes_validation(&mut state) {
                tracing::info!(
                    missing = ?missing_fields(&state.challenge),
                    "launch blocked by validation"
                );
                return Ok(state.launch.clone());
            }
            transition(&mut state, LaunchState::Confirming)?
        };
        self.inner.events.dispatch(&event);
        Ok(LaunchState::Confirming)
    }

    /// `confirming → launched`: submit as active and wait for it. Any
    /// failure returns the flow to `confirming` so the user can retry.
    pub async fn confirm_launch(&self) -> Result<LaunchState, EditorError> {
        let event = {
            let mut state = self.state();
            transition(&mut state, LaunchState::Submitting)?
        };
        self.inner.events.dispatch(&event);

        let result = self.submit(STATUS_ACTIVE).await;
        let next = match result.as_ref().ok().and_then(SaveOutcome::challenge_id) {
            Some(id) => LaunchState::Launched {
                challenge_id: id.to_string(),
            },
            None => LaunchState::Confirming,
        };
        if let Ok(outcome) = &result {
            if next == LaunchState::Confirming {
                tracing::warn!(?outcome, "launch did not complete");
            }
        }

        // A reseed during the submit already moved the flow back to editing.
        let event = {
            let mut state = self.state();
            transition(&mut state, next)
        };
        match event {
            Ok(event) => {
                self.inner.events.dispatch(&event);
            }
            Err(e) => tracing::debug!("launch result not applied: {}", e),
        }

        result?;
        Ok(self.launch_state())
    }

    /// `confirming → editing`. Edits are kept.
    pub fn cancel_launch(&self) -> Result<LaunchState, EditorError> {
        let event = {
            let mut state = self.state();
            transition(&mut state, LaunchState::Editing)?
        };
        self.inner.events.dispatch(&event);
        Ok(LaunchState::Editing)
    }

    pub fn challenge(&self) -> Challenge {
        self.state().challenge.clone()
    }

    /// The remote id all network operations target, if one exists.
    pub fn current_challenge_id(&self) -> Option<String> {
        let state = self.state();
        self.resolve_id(&state)
    }

    pub fn draft(&self) -> DraftRef {
        self.state().draft.clone()
    }

    pub fn launch_state(&self) -> LaunchState {
        self.state().launch.clone()
    }

    pub fn is_saving(&self) -> bool {
        self.state().is_saving
    }

    pub fn has_validation_errors(&self) -> bool {
        self.state().has_validation_errors
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.state().last_saved
    }

    /// "Last Saved: <timestamp>", once anything has been saved.
    pub fn last_saved_label(&self) -> Option<String> {
        self.last_saved()
            .map(|at| format!("Last Saved: {}", at.format("%Y-%m-%d %H:%M:%S UTC")))
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        let state = self.state();
        EditorSnapshot {
            challenge: state.challenge.clone(),
            challenge_id: self.resolve_id(&state),
            is_new: state.is_new,
            is_saving: state.is_saving,
            has_validation_errors: state.has_validation_errors,
            launch: state.launch.clone(),
            last_saved: state.last_saved,
            timeline_template_id: state.timeline_template_id.clone(),
            resources: state.resources.clone(),
        }
    }

    fn state(&self) -> MutexGuard<'_, EditorState> {
        lock(&self.inner.state)
    }

    fn resolve_id(&self, state: &EditorState) -> Option<String> {
        let recovered = self.inner.navigator.query_param(CHALLENGE_ID_PARAM);
        resolve_challenge_id(
            state.explicit_id.as_deref(),
            state.draft.id.as_deref(),
            recovered.as_deref(),
        )
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(task);
            }
            Err(_) => tracing::warn!("no async runtime, background save not scheduled"),
        }
    }

    /// Start a fresh debounce window; any window already running goes stale.
    fn schedule_autosave(&self) {
        let autosave = &self.inner.config.autosave;
        if !autosave.enabled {
            return;
        }
        let window = autosave.debounce();
        let seq = {
            let mut state = self.state();
            state.edit_seq += 1;
            state.edit_seq
        };

        let editor = self.clone();
        self.spawn(async move {
            tokio::time::sleep(window).await;
            let current = editor.state().edit_seq;
            if current != seq {
                tracing::trace!(seq, current, "debounce superseded");
                return;
            }
            match editor.auto_update().await {
                Ok(outcome) => tracing::debug!(?outcome, "auto-save finished"),
                Err(e) => tracing::error!("auto-save failed: {}", e),
            }
        });
    }

    /// Re-arm the debounce if a firing was dropped while saving. Only the
    /// attempt that finds the flag released acts on it.
    fn after_save(&self) {
        let rearm = {
            let mut state = self.state();
            !state.is_saving && std::mem::take(&mut state.resave_pending)
        };
        if rearm {
            tracing::debug!("re-evaluating save skipped while in flight");
            self.schedule_autosave();
        }
    }

    fn prepare(
        &self,
        state: &mut EditorState,
        challenge_id: Option<String>,
        status: &str,
        absorb: bool,
    ) -> Plan {
        let payload = PersistableChallenge::project(
            &state.challenge,
            status,
            ProjectionContext {
                timeline_template_id: state.timeline_template_id.as_deref(),
                project_id: &state.project_id,
                challenge_id: challenge_id.as_deref(),
            },
        );
        let save = PreparedSave {
            generation: state.generation,
            payload,
            challenge_id,
            copilot: state.challenge.copilot.clone(),
            reviewer: state.challenge.reviewer.clone(),
            known: state.resources.clone(),
            metadata: Arc::clone(&state.metadata),
            absorb,
        };
        match SavingGuard::acquire(&self.inner, state) {
            Some(guard) => Plan::Save(guard, save),
            None => Plan::Skip(SkipReason::AlreadySaving),
        }
    }

    async fn run(&self, plan: Plan) -> Result<SaveOutcome, EditorError> {
        match plan {
            Plan::Skip(reason) => Ok(SaveOutcome::Skipped(reason)),
            Plan::CreateDraft => self.create_draft().await,
            Plan::Save(guard, save) => {
                let outcome = self.persist(save).await;
                drop(guard);
                outcome
            }
        }
    }

    async fn create_draft(&self) -> Result<SaveOutcome, EditorError> {
        let (guard, generation, payload) = {
            let mut state = self.state();
            if !state.is_new {
                return Ok(SaveOutcome::Skipped(SkipReason::NotNew));
            }
            if self.resolve_id(&state).is_some() {
                return Ok(SaveOutcome::Skipped(SkipReason::HasRemoteId));
            }
            if state.is_saving {
                return Ok(SaveOutcome::Skipped(SkipReason::AlreadySaving));
            }
            if state.challenge.phases.is_empty() {
                return Ok(SaveOutcome::Skipped(SkipReason::NoPhases));
            }

            let mut payload = PersistableChallenge::project(
                &state.challenge,
                STATUS_DRAFT,
                ProjectionContext {
                    timeline_template_id: state.timeline_template_id.as_deref(),
                    project_id: &state.project_id,
                    challenge_id: None,
                },
            );
            payload.fill_draft_placeholders(&self.inner.config.draft, state.metadata.first_type_id());
            let generation = state.generation;
            match SavingGuard::acquire(&self.inner, &mut state) {
                Some(guard) => (guard, generation, payload),
                None => return Ok(SaveOutcome::Skipped(SkipReason::AlreadySaving)),
            }
        };

        tracing::info!(phases = payload.phases.len(), "creating draft challenge");
        let outcome = match self.inner.api.create_challenge(&payload).await {
            Ok(record) => {
                tracing::info!(challenge_id = %record.id, "draft challenge created");
                self.adopt_remote_id(generation, &record.id);
                self.mark_saved(generation, &record.id, &payload, false);
                self.inner.events.dispatch(&EditorEvent::DraftCreated {
                    challenge_id: record.id.clone(),
                    timestamp: Utc::now(),
                });
                SaveOutcome::Created(record.id)
            }
            Err(e) => self.recover("create_draft", e),
        };
        drop(guard);
        Ok(outcome)
    }

    /// Send the challenge, then bring copilot and reviewer in line.
    /// All calls are sequential.
    async fn persist(&self, save: PreparedSave) -> Result<SaveOutcome, EditorError> {
        let PreparedSave {
            generation,
            payload,
            challenge_id,
            copilot,
            reviewer,
            mut known,
            metadata,
            absorb,
        } = save;
        let api = self.inner.api.as_ref();

        let created = challenge_id.is_none();
        let response = match &challenge_id {
            Some(id) => {
                tracing::info!(challenge_id = %id, status = %payload.status, "updating challenge");
                api.update_challenge(&payload, id).await
            }
            None => {
                tracing::info!(status = %payload.status, "creating challenge");
                api.create_challenge(&payload).await
            }
        };
        let record = match response {
            Ok(record) => record,
            Err(e) => return Ok(self.recover(if created { "create" } else { "update" }, e)),
        };
        if created {
            self.adopt_remote_id(generation, &record.id);
        }
        self.mark_saved(generation, &record.id, &payload, absorb);

        let mut synced = Ok(());
        for (role, handle) in [(ROLE_COPILOT, copilot), (ROLE_REVIEWER, reviewer)] {
            match resources::sync_role(api, &metadata, role, &record.id, handle.as_deref(), &mut known)
                .await
            {
                Ok(action) => self.announce(role, &record.id, action),
                Err(e) => {
                    synced = Err(e);
                    break;
                }
            }
        }
        {
            let mut state = self.state();
            if state.generation == generation {
                state.resources = known;
            }
        }

        match synced {
            Ok(()) if created => Ok(SaveOutcome::Created(record.id)),
            Ok(()) => Ok(SaveOutcome::Updated(record.id)),
            Err(EditorError::Api(e)) => Ok(self.recover("sync_resources", e)),
            Err(e) => {
                tracing::error!(challenge_id = %record.id, "save aborted: {}", e);
                Err(e)
            }
        }
    }

    fn adopt_remote_id(&self, generation: u64, challenge_id: &str) {
        {
            let mut state = self.state();
            if state.generation != generation {
                return;
            }
            if state.draft.id.is_none() {
                state.draft.id = Some(challenge_id.to_string());
            }
        }
        self.inner.navigator.push_query(CHALLENGE_ID_PARAM, challenge_id);
    }

    fn mark_saved(
        &self,
        generation: u64,
        challenge_id: &str,
        payload: &PersistableChallenge,
        absorb: bool,
    ) {
        let saved_at = Utc::now();
        {
            let mut state = self.state();
            if state.generation == generation {
                state.last_saved = Some(saved_at);
                if absorb {
                    state.challenge.absorb(payload);
                }
            }
        }
        self.inner.events.dispatch(&EditorEvent::ChallengeSaved {
            challenge_id: challenge_id.to_string(),
            status: payload.status.clone(),
            saved_at,
        });
    }

    fn announce(&self, role: &str, challenge_id: &str, action: SyncAction) {
        let event = match action {
            SyncAction::Unchanged => return,
            SyncAction::Created(created) => EditorEvent::ResourceAssigned {
                challenge_id: challenge_id.to_string(),
                role: role.to_string(),
                member_handle: created.member_handle,
                timestamp: Utc::now(),
            },
            SyncAction::Replaced { removed, created } => EditorEvent::ResourceReplaced {
                challenge_id: challenge_id.to_string(),
                role: role.to_string(),
                previous_handle: removed.member_handle,
                member_handle: created.member_handle,
                timestamp: Utc::now(),
            },
        };
        self.inner.events.dispatch(&event);
    }

    /// Swallow a backend failure: log it, tell the sinks, and let the
    /// next edit retry.
    fn recover(&self, operation: &str, error: ApiError) -> SaveOutcome {
        tracing::warn!(
            operation,
            category = error.category(),
            retryable = error.is_retryable(),
            "save failed, will retry on next edit: {}",
            error
        );
        self.inner
            .events
            .dispatch(&EditorEvent::save_failed(operation, error.category(), error.to_string()));
        SaveOutcome::Recovered(error)
    }
}

fn lock(state: &Mutex<EditorState>) -> MutexGuard<'_, EditorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns the validation result and records it in
/// `has_validation_errors`; on failure also sets `submitTriggered`.
fn passes_validation(state: &mut EditorState) -> bool {
    let valid = is_valid(&state.challenge);
    state.has_validation_errors = !valid;
    if valid {
        return true;
    }
    let next = apply(&state.challenge, Intent::MarkSubmitTriggered);
    state.challenge = next;
    false
}

fn transition(state: &mut EditorState, next: LaunchState) -> Result<EditorEvent, EditorError> {
    if !state.launch.can_transition_to(&next) {
        return Err(invalid_transition(&state.launch, &next));
    }
    let event = EditorEvent::launch_state_changed(&state.launch, &next);
    tracing::info!(from = %state.launch, to = %next, "launch state changed");
    state.launch = next;
    Ok(event)
}

fn invalid_transition(from: &LaunchState, to: &LaunchState) -> EditorError {
    EditorError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// Build the editor state for `ctx`, carrying over what belongs to the
/// same challenge from `previous`.
fn seed(previous: Option<&EditorState>, ctx: EditorContext, now: DateTime<Utc>) -> EditorState {
    let same = previous
        .filter(|prev| prev.is_new == ctx.is_new && prev.explicit_id == ctx.challenge_id);
    let metadata = Arc::new(ctx.metadata);

    let challenge = if ctx.is_new {
        match same {
            Some(prev) => prev.challenge.clone(),
            None => Challenge::template(now),
        }
    } else {
        let details = ctx.details.unwrap_or_else(|| Value::Object(Map::new()));
        let mut challenge = Challenge::seeded(&details, ctx.attachments, now);
        if challenge.id.is_none() {
            challenge.id = ctx.challenge_id.clone();
        }
        let local = same.map(|prev| &prev.challenge);
        challenge.copilot = local
            .and_then(|c| c.copilot.clone())
            .or_else(|| assigned_handle(&metadata, &ctx.resources, ROLE_COPILOT));
        challenge.reviewer = local
            .and_then(|c| c.reviewer.clone())
            .or_else(|| assigned_handle(&metadata, &ctx.resources, ROLE_REVIEWER));
        challenge
    };

    let timeline_template_id = same
        .and_then(|prev| prev.timeline_template_id.clone())
        .or_else(|| {
            challenge
                .extra
                .get("timelineTemplateId")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .or_else(|| metadata.default_timeline_template().map(|t| t.id.clone()));

    EditorState {
        is_new: ctx.is_new,
        explicit_id: ctx.challenge_id,
        project_id: ctx.project_id,
        metadata,
        challenge,
        draft: same.map(|prev| prev.draft.clone()).unwrap_or_default(),
        timeline_template_id,
        resources: ctx.resources,
        is_saving: previous.is_some_and(|prev| prev.is_saving),
        has_validation_errors: false,
        resave_pending: same.is_some_and(|prev| prev.resave_pending),
        // A carried-over record keeps its pending debounce; a replaced one
        // invalidates it.
        edit_seq: match (previous, same) {
            (Some(prev), Some(_)) if ctx.is_new => prev.edit_seq,
            (Some(prev), _) => prev.edit_seq + 1,
            (None, _) => 0,
        },
        generation: match (previous, same) {
            (Some(prev), Some(_)) => prev.generation,
            (Some(prev), None) => prev.generation + 1,
            (None, _) => 0,
        },
        launch: LaunchState::Editing,
        last_saved: same.and_then(|prev| prev.last_saved),
    }
}

fn assigned_handle(metadata: &Metadata, resources: &[Resource], role_name: &str) -> Option<String> {
    let role = metadata.role_by_name(role_name)?;
    resources
        .iter()
        .find(|resource| resource.role_id == role.id)
        .map(|resource| resource.member_handle.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::MemoryNavigator;
    use ce_api::{ApiOperation, MemoryChallengeApi};
    use ce_challenge::ResourcePayload;
    use serde_json::json;

    fn metadata() -> Metadata {
        serde_json::from_value(json!({
            "challengeTypes": [{"id": "t-1", "name": "Challenge"}],
            "timelineTemplates": [{"id": "tl-1", "name": "Standard", "phases": ["p-1"]}],
            "challengePhases": [{"id": "p-1", "name": "Submission", "duration": 7}],
            "resourceRoles": [{"id": "r-copilot", "name": "Copilot"}, {"id": "r-reviewer", "name": "Reviewer"}]
        }))
        .unwrap()
    }

    fn details() -> Value {
        json!({
            "id": "c-1",
            "name": "Build it",
            "track": "DEVELOP",
            "typeId": "t-1",
            "description": "All of it",
            "tags": ["rust"],
            "prizeSets": [{"type": "Challenge prizes", "prizes": [{"type": "money", "value": "$500"}]}],
            "copilot": "ignored-in-details"
        })
    }

    fn editor(ctx: EditorContext, api: Arc<MemoryChallengeApi>) -> ChallengeEditor {
        let navigator = Arc::new(MemoryNavigator::new("/challenges/new").unwrap());
        ChallengeEditor::new(ctx, api, navigator)
    }

    #[test]
    fn new_challenge_seeds_from_template() {
        let now = Utc::now();
        let state = seed(None, EditorContext::new_challenge("proj-1", metadata()), now);
        assert!(state.challenge.phases.is_empty());
        assert!(state.challenge.attachments.is_empty());
        assert_eq!(state.challenge.start_date, Some(now + chrono::Duration::hours(1)));
        assert_eq!(state.timeline_template_id.as_deref(), Some("tl-1"));
    }

    #[test]
    fn existing_challenge_takes_handles_from_resources() {
        let resources = vec![ResourcePayload::new("c-1", "alice", "r-copilot").into_resource(None)];
        let ctx = EditorContext::existing("c-1", "proj-1", metadata(), json!({"name": "x"}))
            .with_resources(resources)
            .with_attachments(vec![Attachment::new("brief.pdf", 3)]);
        let state = seed(None, ctx, Utc::now());

        assert_eq!(state.challenge.copilot.as_deref(), Some("alice"));
        assert_eq!(state.challenge.reviewer, None);
        assert_eq!(state.challenge.id.as_deref(), Some("c-1"));
        assert_eq!(state.challenge.attachments.len(), 1);
    }

    #[tokio::test]
    async fn reseed_keeps_local_handles_for_same_challenge() {
        let api = Arc::new(MemoryChallengeApi::new());
        let ctx = EditorContext::existing("c-1", "proj-1", metadata(), details());
        let editor = editor(ctx.clone(), api);
        editor.edit(Intent::other("copilot", "bob"));

        let resources = vec![ResourcePayload::new("c-1", "alice", "r-copilot").into_resource(None)];
        editor.reset(ctx.with_resources(resources));
        assert_eq!(editor.challenge().copilot.as_deref(), Some("bob"));

        let other = EditorContext::existing("c-2", "proj-1", metadata(), json!({"name": "y"}));
        editor.reset(other);
        assert_eq!(editor.challenge().copilot, None);
        assert_eq!(editor.challenge().name, "y");
    }

    #[tokio::test]
    async fn reseed_returns_launch_to_editing() {
        let api = Arc::new(MemoryChallengeApi::new());
        let ctx = EditorContext::existing("c-1", "proj-1", metadata(), details());
        let editor = editor(ctx.clone(), api);

        assert_eq!(editor.request_launch().unwrap(), LaunchState::Confirming);
        editor.reset(ctx);
        assert_eq!(editor.launch_state(), LaunchState::Editing);
    }

    #[tokio::test]
    async fn submit_invalid_marks_record() {
        let api = Arc::new(MemoryChallengeApi::new());
        let editor = editor(EditorContext::new_challenge("proj-1", metadata()), api.clone());

        let outcome = editor.submit(STATUS_DRAFT).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Skipped(SkipReason::Invalid));
        assert!(editor.challenge().submit_triggered);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn validation_error_flag_clears_once_record_passes() {
        let api = Arc::new(MemoryChallengeApi::new());
        let mut incomplete = details();
        incomplete["description"] = json!("");
        let editor = editor(EditorContext::existing("c-1", "proj-1", metadata(), incomplete), api);
        assert!(!editor.has_validation_errors());

        assert!(!editor.validate());
        assert!(editor.has_validation_errors());
        assert!(editor.snapshot().has_validation_errors);

        editor.edit(Intent::set("description", "All of it"));
        assert!(editor.validate());
        assert!(!editor.has_validation_errors());
        // The submit marker stays for field components.
        assert!(editor.challenge().submit_triggered);
    }

    #[tokio::test]
    async fn submit_without_id_creates_and_records_query() {
        let api = Arc::new(MemoryChallengeApi::new());
        let navigator = Arc::new(MemoryNavigator::new("/challenges/new").unwrap());
        let ctx = EditorContext::new_challenge("proj-1", metadata());
        let editor = ChallengeEditor::new(ctx, api.clone(), navigator.clone());
        for (field, value) in [("name", "n"), ("track", "DEVELOP"), ("typeId", "t-1"), ("description", "d")] {
            editor.edit(Intent::set(field, value));
        }
        editor.edit(Intent::SetMultiValue {
            field: "tags".into(),
            raw: Some("rust".into()),
        });
        editor.edit(Intent::set(
            "prizeSets",
            json!([{"type": "Challenge prizes", "prizes": [{"type": "money", "value": "$1,000"}]}]),
        ));

        let outcome = editor.submit(STATUS_DRAFT).await.unwrap();
        let id = outcome.challenge_id().unwrap().to_string();
        assert!(matches!(outcome, SaveOutcome::Created(_)));
        assert_eq!(navigator.query_param(CHALLENGE_ID_PARAM), Some(id.clone()));
        assert_eq!(editor.current_challenge_id(), Some(id));
        assert_eq!(api.challenge(editor.draft().id.as_deref().unwrap()).unwrap().prize_sets[0].prizes[0].value, 1000);
        assert_eq!(editor.challenge().prize_sets[0].prizes[0].value, "$1,000");
        assert!(editor.last_saved_label().unwrap().starts_with("Last Saved: "));
    }

    #[tokio::test]
    async fn failed_update_is_recovered_and_releases_flag() {
        let api = Arc::new(MemoryChallengeApi::new());
        api.fail_next(ApiOperation::UpdateChallenge, ApiError::Network("reset".into()));
        let editor = editor(EditorContext::existing("c-1", "proj-1", metadata(), details()), api.clone());

        let outcome = editor.auto_update().await.unwrap();
        assert!(matches!(outcome, SaveOutcome::Recovered(ApiError::Network(_))));
        assert!(!editor.is_saving());
        assert_eq!(editor.challenge().name, "Build it");
        assert!(editor.last_saved().is_none());

        assert!(matches!(editor.auto_update().await.unwrap(), SaveOutcome::Updated(_)));
    }

    #[tokio::test]
    async fn existing_without_id_skips_update() {
        let api = Arc::new(MemoryChallengeApi::new());
        let ctx = EditorContext {
            is_new: false,
            project_id: "proj-1".into(),
            metadata: metadata(),
            ..EditorContext::default()
        };
        let editor = editor(ctx, api.clone());
        assert_eq!(
            editor.auto_update().await.unwrap(),
            SaveOutcome::Skipped(SkipReason::NoRemoteId)
        );
    }

    #[tokio::test]
    async fn select_timeline_replaces_phases() {
        let api = Arc::new(MemoryChallengeApi::new());
        let editor = editor(EditorContext::existing("c-1", "proj-1", metadata(), details()), api);

        assert!(editor.select_timeline("tl-1"));
        assert!(!editor.select_timeline("tl-missing"));
        let phases = editor.challenge().phases;
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].phase_id, "p-1");
        assert_eq!(editor.snapshot().timeline_template_id.as_deref(), Some("tl-1"));
    }

    #[test]
    fn edit_without_runtime_still_applies() {
        let api = Arc::new(MemoryChallengeApi::new());
        let editor = editor(EditorContext::new_challenge("proj-1", metadata()), api);
        editor.edit(Intent::set("name", "offline"));
        assert_eq!(editor.challenge().name, "offline");
    }
}
