// launch.rs — `ce launch`: confirm and submit a challenge as active.
//
// Runs the same flow the editor UI does: validation gate, confirmation,
// submit with status Active, then role reconciliation. With `--dry-run`
// the calls go to an in-memory backend and are printed instead.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use serde_json::Value;

use ce_api::{ApiCall, ChallengeApi, HttpChallengeApi, MemoryChallengeApi};
use ce_challenge::{missing_fields, Intent, Metadata, Resource};
use ce_editor::{
    ChallengeEditor, EditorConfig, EditorContext, EventDispatcher, LaunchState, LogSink,
    MemoryNavigator,
};

#[derive(Args)]
pub struct LaunchArgs {
    /// Challenge details (JSON). A record without an `id` is created.
    pub challenge: PathBuf,

    /// Metadata catalogs (JSON).
    #[arg(long)]
    pub metadata: PathBuf,

    /// Project the challenge belongs to.
    #[arg(long)]
    pub project: String,

    /// Current role assignments of the challenge (JSON array).
    #[arg(long)]
    pub resources: Option<PathBuf>,

    /// Assign this member as copilot before launching.
    #[arg(long)]
    pub copilot: Option<String>,

    /// Assign this member as reviewer before launching.
    #[arg(long)]
    pub reviewer: Option<String>,

    /// Send calls to an in-memory backend and print them.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute(args: &LaunchArgs, config: &EditorConfig, project_root: &Path) -> anyhow::Result<()> {
    let ctx = load_context(args)?;

    // One-shot run: the launch submit is the only save.
    let mut config = config.clone();
    config.autosave.enabled = false;

    let mut events = EventDispatcher::new();
    if let Some(log) = &config.events_log {
        events.add_sink(Box::new(LogSink::new(project_root.join(log))));
    }

    let memory = args.dry_run.then(|| {
        ctx.resources
            .iter()
            .cloned()
            .fold(MemoryChallengeApi::new(), MemoryChallengeApi::with_resource)
    });
    let memory = memory.map(Arc::new);
    let api: Arc<dyn ChallengeApi> = match &memory {
        Some(memory) => memory.clone(),
        None => Arc::new(HttpChallengeApi::new(config.api.clone())),
    };
    tracing::info!(backend = api.name(), project = %args.project, "launching challenge");

    let location = match &ctx.challenge_id {
        Some(id) => format!("/challenges/{}", id),
        None => "/challenges/new".to_string(),
    };
    let navigator = Arc::new(MemoryNavigator::new(&location)?);

    let runtime = tokio::runtime::Runtime::new()?;
    let state = runtime.block_on(async {
        let editor = ChallengeEditor::with_config(ctx, api, navigator, config, events);
        if let Some(handle) = &args.copilot {
            editor.edit(Intent::set("copilot", handle.as_str()));
        }
        if let Some(handle) = &args.reviewer {
            editor.edit(Intent::set("reviewer", handle.as_str()));
        }
        launch(&editor).await
    })?;

    if let Some(memory) = &memory {
        print_calls(&memory.calls());
    }

    match state {
        LaunchState::Launched { challenge_id } => {
            println!("Launched: {}", challenge_id);
            Ok(())
        }
        other => anyhow::bail!("launch did not complete (state: {})", other),
    }
}

async fn launch(editor: &ChallengeEditor) -> anyhow::Result<LaunchState> {
    if editor.request_launch()? != LaunchState::Confirming {
        let missing = missing_fields(&editor.challenge());
        anyhow::bail!("challenge is missing required fields: {}", missing.join(", "));
    }
    let state = editor.confirm_launch().await?;
    if let Some(label) = editor.last_saved_label() {
        println!("{}", label);
    }
    Ok(state)
}

fn load_context(args: &LaunchArgs) -> anyhow::Result<EditorContext> {
    let details: Value = serde_json::from_str(&std::fs::read_to_string(&args.challenge)?)?;
    let metadata = Metadata::load(&args.metadata)?;
    let resources: Vec<Resource> = match &args.resources {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => Vec::new(),
    };

    Ok(EditorContext {
        is_new: false,
        challenge_id: details
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        project_id: args.project.clone(),
        metadata,
        details: Some(details),
        attachments: Vec::new(),
        resources,
    })
}

fn print_calls(calls: &[ApiCall]) {
    println!("{} call(s) sent:", calls.len());
    for call in calls {
        match call {
            ApiCall::CreateChallenge(payload) => {
                println!("  create challenge  status={}", payload.status)
            }
            ApiCall::UpdateChallenge {
                challenge_id,
                payload,
            } => println!("  update challenge  {} status={}", challenge_id, payload.status),
            ApiCall::CreateResource(resource) => println!(
                "  create resource   {} role={}",
                resource.member_handle, resource.role_id
            ),
            ApiCall::DeleteResource(resource) => println!(
                "  delete resource   {} role={}",
                resource.member_handle, resource.role_id
            ),
        }
    }
}
