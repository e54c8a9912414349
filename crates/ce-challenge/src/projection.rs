// projection.rs — The persistable projection sent to the backend.
//
// The record carries editor-only state (display-form prizes, raw
// attachment objects, copilot/reviewer handles, checkbox groups). The
// backend gets a fixed allow-list of fields, with prize values converted
// to base units and the timeline template, project and status injected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::challenge::{Challenge, Phase, Prize, PrizeSet};
use crate::currency;

/// Editing-context values injected into every projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionContext<'a> {
    /// Active timeline template.
    pub timeline_template_id: Option<&'a str>,

    pub project_id: &'a str,

    /// Remote id, when one is known. Attachment ids are only sent then.
    pub challenge_id: Option<&'a str>,
}

/// A prize with its value in base integer units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedPrize {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedPrizeSet {
    #[serde(rename = "type")]
    pub kind: String,
    pub prizes: Vec<PersistedPrize>,
}

impl From<&PrizeSet> for PersistedPrizeSet {
    fn from(set: &PrizeSet) -> Self {
        Self {
            kind: set.kind.clone(),
            prizes: set
                .prizes
                .iter()
                .map(|prize| PersistedPrize {
                    kind: prize.kind.clone(),
                    value: currency::dollars_to_integer(&prize.value),
                })
                .collect(),
        }
    }
}

/// Body of a challenge create or update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistableChallenge {
    pub phases: Vec<Phase>,
    pub type_id: String,
    pub track: String,
    pub name: String,
    pub description: String,
    pub private_description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_type: Option<Value>,

    pub tags: Vec<String>,
    pub groups: Vec<String>,
    pub prize_sets: Vec<PersistedPrizeSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    /// Omitted entirely when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_template_id: Option<String>,

    pub project_id: String,
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_ids: Option<Vec<String>>,
}

impl PersistableChallenge {
    /// Project `challenge` for persistence with the given `status`.
    pub fn project(challenge: &Challenge, status: &str, ctx: ProjectionContext<'_>) -> Self {
        Self {
            phases: challenge.phases.clone(),
            type_id: challenge.type_id.clone(),
            track: challenge.track.clone(),
            name: challenge.name.clone(),
            description: challenge.description.clone(),
            private_description: challenge.private_description.clone(),
            review_type: challenge.extra.get("reviewType").cloned(),
            tags: challenge.tags.clone(),
            groups: challenge.groups.clone(),
            prize_sets: challenge.prize_sets.iter().map(PersistedPrizeSet::from).collect(),
            start_date: challenge.start_date,
            terms_ids: challenge.terms_ids.clone(),
            timeline_template_id: ctx.timeline_template_id.map(str::to_string),
            project_id: ctx.project_id.to_string(),
            status: status.to_string(),
            attachment_ids: ctx.challenge_id.map(|_| challenge.attachment_ids()),
        }
    }

    /// Fill every still-empty required field with a placeholder so a draft
    /// can be created before the user finishes the form.
    pub fn fill_draft_placeholders(&mut self, placeholders: &DraftPlaceholders, first_type_id: Option<&str>) {
        if self.type_id.is_empty() {
            if let Some(type_id) = first_type_id {
                self.type_id = type_id.to_string();
            }
        }
        if self.track.is_empty() {
            self.track = placeholders.track.clone();
        }
        if self.name.is_empty() {
            self.name = placeholders.name.clone();
        }
        if self.description.is_empty() {
            self.description = placeholders.description.clone();
        }
        if self.prize_sets.is_empty() {
            self.prize_sets = vec![PersistedPrizeSet {
                kind: placeholders.prize_set_type.clone(),
                prizes: vec![PersistedPrize {
                    kind: placeholders.prize_type.clone(),
                    value: placeholders.prize_value,
                }],
            }];
        }
        if self.tags.is_empty() {
            self.tags = vec![placeholders.tag.clone()];
        }
    }
}

impl Challenge {
    /// Fold a submitted projection back into the record: status and prize
    /// values now reflect what the backend accepted.
    pub fn absorb(&mut self, submitted: &PersistableChallenge) {
        self.status = Some(submitted.status.clone());
        self.prize_sets = submitted
            .prize_sets
            .iter()
            .map(|set| PrizeSet {
                kind: set.kind.clone(),
                prizes: set
                    .prizes
                    .iter()
                    .map(|prize| Prize {
                        kind: prize.kind.clone(),
                        value: currency::format_dollars(prize.value),
                    })
                    .collect(),
            })
            .collect();
    }
}

/// Placeholder values that make a draft creation call succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPlaceholders {
    #[serde(default = "default_track")]
    pub track: String,

    #[serde(default = "default_text")]
    pub name: String,

    #[serde(default = "default_text")]
    pub description: String,

    #[serde(default = "default_prize_set_type")]
    pub prize_set_type: String,

    #[serde(default = "default_prize_type")]
    pub prize_type: String,

    #[serde(default = "default_prize_value")]
    pub prize_value: i64,

    #[serde(default = "default_tag")]
    pub tag: String,
}

impl Default for DraftPlaceholders {
    fn default() -> Self {
        Self {
            track: default_track(),
            name: default_text(),
            description: default_text(),
            prize_set_type: default_prize_set_type(),
            prize_type: default_prize_type(),
            prize_value: default_prize_value(),
            tag: default_tag(),
        }
    }
}

// Serde default functions
fn default_track() -> String {
    "DEVELOP".to_string()
}

fn default_text() -> String {
    "Draft".to_string()
}

fn default_prize_set_type() -> String {
    "Challenge prizes".to_string()
}

fn default_prize_type() -> String {
    "money".to_string()
}

fn default_prize_value() -> i64 {
    1
}

fn default_tag() -> String {
    "Heroku".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::Attachment;

    fn challenge() -> Challenge {
        Challenge {
            name: "Build it".to_string(),
            prize_sets: vec![PrizeSet {
                kind: "Challenge prizes".to_string(),
                prizes: vec![Prize {
                    kind: "money".to_string(),
                    value: "$1,000".to_string(),
                }],
            }],
            attachments: vec![
                Attachment {
                    id: Some("a-1".to_string()),
                    ..Attachment::new("spec.pdf", 10)
                },
                Attachment::new("pending.txt", 1),
            ],
            copilot: Some("alice".to_string()),
            ..Challenge::default()
        }
    }

    fn ctx(challenge_id: Option<&str>) -> ProjectionContext<'_> {
        ProjectionContext {
            timeline_template_id: Some("tl-1"),
            project_id: "proj-7",
            challenge_id,
        }
    }

    #[test]
    fn prize_values_convert_to_base_units() {
        let payload = PersistableChallenge::project(&challenge(), "Draft", ctx(None));
        assert_eq!(payload.prize_sets[0].prizes[0].value, 1000);
        assert_eq!(payload.project_id, "proj-7");
        assert_eq!(payload.timeline_template_id.as_deref(), Some("tl-1"));
        assert_eq!(payload.status, "Draft");
    }

    #[test]
    fn attachment_ids_only_with_remote_id() {
        let without = PersistableChallenge::project(&challenge(), "Draft", ctx(None));
        assert!(without.attachment_ids.is_none());

        let with = PersistableChallenge::project(&challenge(), "Draft", ctx(Some("c-1")));
        assert_eq!(with.attachment_ids, Some(vec!["a-1".to_string()]));

        let json = serde_json::to_value(&with).unwrap();
        assert!(json.get("attachments").is_none());
        assert!(json.get("copilot").is_none());
    }

    #[test]
    fn empty_terms_ids_are_omitted() {
        let payload = PersistableChallenge::project(&challenge(), "Draft", ctx(None));
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("termsIds").is_none());

        let mut with_terms = challenge();
        with_terms.terms_ids = vec!["t-1".to_string()];
        let json = serde_json::to_value(PersistableChallenge::project(&with_terms, "Draft", ctx(None))).unwrap();
        assert_eq!(json["termsIds"], serde_json::json!(["t-1"]));
    }

    #[test]
    fn placeholders_fill_only_empty_fields() {
        let mut payload = PersistableChallenge::project(&challenge(), "Draft", ctx(None));
        payload.fill_draft_placeholders(&DraftPlaceholders::default(), Some("t-1"));
        assert_eq!(payload.name, "Build it");
        assert_eq!(payload.type_id, "t-1");
        assert_eq!(payload.track, "DEVELOP");
        assert_eq!(payload.description, "Draft");
        assert_eq!(payload.tags, vec!["Heroku"]);
        assert_eq!(payload.prize_sets[0].prizes[0].value, 1000);
    }

    #[test]
    fn placeholder_prize_is_added_when_none() {
        let mut payload = PersistableChallenge::project(&Challenge::default(), "Draft", ctx(None));
        payload.fill_draft_placeholders(&DraftPlaceholders::default(), None);
        assert_eq!(payload.prize_sets.len(), 1);
        assert_eq!(payload.prize_sets[0].kind, "Challenge prizes");
        assert_eq!(payload.prize_sets[0].prizes[0].value, 1);
        assert!(payload.type_id.is_empty());
    }

    #[test]
    fn absorb_restores_display_form() {
        let mut record = challenge();
        let payload = PersistableChallenge::project(&record, "Active", ctx(Some("c-1")));
        record.absorb(&payload);
        assert_eq!(record.status.as_deref(), Some("Active"));
        assert_eq!(record.prize_sets[0].prizes[0].value, "$1,000");
        assert_eq!(
            currency::dollars_to_integer(&record.prize_sets[0].prizes[0].value),
            1000
        );
    }

    #[test]
    fn placeholders_deserialize_with_defaults() {
        let placeholders: DraftPlaceholders = serde_json::from_str(r#"{"tag": "rust"}"#).unwrap();
        assert_eq!(placeholders.tag, "rust");
        assert_eq!(placeholders.track, "DEVELOP");
    }
}
