// payload.rs — `ce payload`: print what a save would send.

use std::path::PathBuf;

use clap::Args;

use ce_challenge::{Challenge, Metadata, PersistableChallenge, ProjectionContext};
use ce_editor::EditorConfig;

#[derive(Args)]
pub struct PayloadArgs {
    /// Challenge record (JSON).
    pub challenge: PathBuf,

    /// Metadata catalogs (JSON). Supplies the default timeline and the
    /// first challenge type for draft placeholders.
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Project the challenge belongs to.
    #[arg(long, default_value = "")]
    pub project: String,

    /// Status to send (defaults to the record's own, else Draft).
    #[arg(long)]
    pub status: Option<String>,

    /// Remote id; attachment ids are only included when one is given.
    #[arg(long)]
    pub challenge_id: Option<String>,

    /// Timeline template (defaults to the record's, else the catalog default).
    #[arg(long)]
    pub timeline: Option<String>,

    /// Fill empty required fields with the configured draft placeholders.
    #[arg(long)]
    pub draft: bool,
}

pub fn execute(args: &PayloadArgs, config: &EditorConfig) -> anyhow::Result<()> {
    let challenge = Challenge::load(&args.challenge)?;
    let metadata = match &args.metadata {
        Some(path) => Metadata::load(path)?,
        None => Metadata::default(),
    };
    let payload = build(&challenge, &metadata, args, config);
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn build(
    challenge: &Challenge,
    metadata: &Metadata,
    args: &PayloadArgs,
    config: &EditorConfig,
) -> PersistableChallenge {
    let timeline = args
        .timeline
        .clone()
        .or_else(|| {
            challenge
                .extra
                .get("timelineTemplateId")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .or_else(|| metadata.default_timeline_template().map(|t| t.id.clone()));
    let status = args
        .status
        .as_deref()
        .unwrap_or_else(|| challenge.status_or_draft());
    let challenge_id = args.challenge_id.as_deref().or(challenge.id.as_deref());

    let mut payload = PersistableChallenge::project(
        challenge,
        status,
        ProjectionContext {
            timeline_template_id: timeline.as_deref(),
            project_id: &args.project,
            challenge_id,
        },
    );
    if args.draft {
        payload.fill_draft_placeholders(&config.draft, metadata.first_type_id());
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> PayloadArgs {
        PayloadArgs {
            challenge: PathBuf::from("challenge.json"),
            metadata: None,
            project: "proj-7".into(),
            status: None,
            challenge_id: None,
            timeline: None,
            draft: false,
        }
    }

    fn metadata() -> Metadata {
        serde_json::from_value(json!({
            "challengeTypes": [{"id": "t-1", "name": "Challenge"}],
            "timelineTemplates": [{"id": "tl-1", "name": "Standard", "phases": []}]
        }))
        .unwrap()
    }

    #[test]
    fn payload_defaults_to_draft_and_catalog_timeline() {
        let challenge = Challenge::from_json(r#"{"name": "Ship it"}"#).unwrap();
        let payload = build(&challenge, &metadata(), &args(), &EditorConfig::default());

        assert_eq!(payload.status, "Draft");
        assert_eq!(payload.project_id, "proj-7");
        assert_eq!(payload.timeline_template_id.as_deref(), Some("tl-1"));
        assert_eq!(payload.attachment_ids, None);
    }

    #[test]
    fn draft_flag_fills_placeholders() {
        let challenge = Challenge::from_json("{}").unwrap();
        let mut args = args();
        args.draft = true;
        let config = EditorConfig::default();
        let payload = build(&challenge, &metadata(), &args, &config);

        assert_eq!(payload.type_id, "t-1");
        assert_eq!(payload.track, config.draft.track);
        assert_eq!(payload.tags, vec![config.draft.tag.clone()]);
        assert_eq!(payload.prize_sets.len(), 1);
    }

    #[test]
    fn known_id_includes_attachment_ids() {
        let challenge = Challenge::from_json(
            r#"{"id": "c-1", "attachments": [{"id": "a-1", "fileName": "spec.pdf", "size": 10}]}"#,
        )
        .unwrap();
        let payload = build(&challenge, &metadata(), &args(), &EditorConfig::default());
        assert_eq!(payload.attachment_ids, Some(vec!["a-1".to_string()]));
    }
}
