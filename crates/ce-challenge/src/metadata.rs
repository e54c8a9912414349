// metadata.rs — Read-only catalogs supplied by the embedding context.
//
// Types, tracks, timeline templates, phase definitions, terms, groups and
// resource roles come from the backend and never change during an edit
// session. The editor only reads them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::challenge::Phase;
use crate::error::ChallengeError;

/// A challenge type ("Challenge", "Task", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeType {
    pub id: String,
    pub name: String,
}

/// A phase definition from the phase catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Default duration for the phase.
    #[serde(default)]
    pub duration: i64,
}

/// A phase reference inside a timeline template. The backend sends either
/// `{"phaseId": "..."}` objects or bare id strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplatePhase {
    Ref {
        #[serde(rename = "phaseId")]
        phase_id: String,
    },
    Id(String),
}

impl TemplatePhase {
    pub fn phase_id(&self) -> &str {
        match self {
            TemplatePhase::Ref { phase_id } => phase_id,
            TemplatePhase::Id(id) => id,
        }
    }
}

/// A timeline template: an ordered selection of phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineTemplate {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub phases: Vec<TemplatePhase>,
}

/// A resource role ("Copilot", "Reviewer", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRole {
    pub id: String,
    pub name: String,
}

/// An entry in a simple id/name catalog (terms, groups).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,

    #[serde(default)]
    pub name: String,
}

/// All catalogs the editor consults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub challenge_types: Vec<ChallengeType>,

    #[serde(default)]
    pub tracks: Vec<String>,

    #[serde(default)]
    pub timeline_templates: Vec<TimelineTemplate>,

    #[serde(default)]
    pub challenge_phases: Vec<PhaseDefinition>,

    #[serde(default)]
    pub challenge_terms: Vec<CatalogEntry>,

    #[serde(default)]
    pub groups: Vec<CatalogEntry>,

    #[serde(default)]
    pub resource_roles: Vec<ResourceRole>,
}

impl Metadata {
    /// Read catalogs from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ChallengeError> {
        let json = std::fs::read_to_string(path).map_err(|source| ChallengeError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn first_type_id(&self) -> Option<&str> {
        self.challenge_types.first().map(|t| t.id.as_str())
    }

    pub fn type_name(&self, type_id: &str) -> Option<&str> {
        self.challenge_types
            .iter()
            .find(|t| t.id == type_id)
            .map(|t| t.name.as_str())
    }

    pub fn role_by_name(&self, name: &str) -> Option<&ResourceRole> {
        self.resource_roles.iter().find(|role| role.name == name)
    }

    pub fn timeline_template(&self, id: &str) -> Option<&TimelineTemplate> {
        self.timeline_templates.iter().find(|t| t.id == id)
    }

    /// The template used when the user has not picked one.
    pub fn default_timeline_template(&self) -> Option<&TimelineTemplate> {
        self.timeline_templates.first()
    }

    /// Phases selected by `template`, in phase-catalog order, with the
    /// catalog's default durations.
    pub fn phases_for_template(&self, template: &TimelineTemplate) -> Vec<Phase> {
        self.challenge_phases
            .iter()
            .filter(|definition| {
                template
                    .phases
                    .iter()
                    .any(|phase| phase.phase_id() == definition.id)
            })
            .map(|definition| Phase::new(definition.id.clone(), definition.duration))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> Metadata {
        serde_json::from_str(
            r#"{
                "challengeTypes": [{"id": "t-1", "name": "Challenge"}, {"id": "t-2", "name": "Task"}],
                "timelineTemplates": [
                    {"id": "tl-1", "name": "Standard", "phases": [{"phaseId": "review"}, "submission"]}
                ],
                "challengePhases": [
                    {"id": "registration", "name": "Registration", "duration": 5},
                    {"id": "submission", "name": "Submission", "duration": 7},
                    {"id": "review", "name": "Review", "duration": 2}
                ],
                "resourceRoles": [{"id": "r-1", "name": "Copilot"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn template_phases_accept_objects_and_bare_ids() {
        let metadata = metadata();
        let template = metadata.default_timeline_template().unwrap();
        assert_eq!(template.phases[0].phase_id(), "review");
        assert_eq!(template.phases[1].phase_id(), "submission");
    }

    #[test]
    fn phases_follow_catalog_order_and_durations() {
        let metadata = metadata();
        let template = metadata.timeline_template("tl-1").unwrap();
        let phases = metadata.phases_for_template(template);
        let ids: Vec<&str> = phases.iter().map(|p| p.phase_id.as_str()).collect();
        assert_eq!(ids, vec!["submission", "review"]);
        assert_eq!(phases[0].duration, 7);
    }

    #[test]
    fn lookups_by_name_and_id() {
        let metadata = metadata();
        assert_eq!(metadata.first_type_id(), Some("t-1"));
        assert_eq!(metadata.type_name("t-2"), Some("Task"));
        assert_eq!(metadata.role_by_name("Copilot").unwrap().id, "r-1");
        assert!(metadata.role_by_name("Reviewer").is_none());
    }
}
