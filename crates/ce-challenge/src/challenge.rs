// challenge.rs — Challenge: the in-memory record being edited.
//
// The record mixes strongly-typed fields (the ones the editor reasons
// about: name, track, prizes, phases, ...) with an open map of any other
// fields the backend sends or the form writes (checkbox groups, legacy
// `terms`, `checkpointPrizes`, ...). Both halves are addressable by their
// wire name through `field()` / `set_field()`, which is what the intent
// applicators build on.
//
// Deserialization is lenient so seeding stays total: `null` collections
// become empty, numbers may arrive as display strings, and a malformed
// start date is dropped instead of failing the whole record.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::currency;
use crate::error::ChallengeError;

/// Status sent on auto-save when the record has none yet.
pub const STATUS_DRAFT: &str = "Draft";

/// Status sent when the challenge is launched.
pub const STATUS_ACTIVE: &str = "Active";

/// One prize inside a prize set. `value` is kept in display form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Prize {
    #[serde(rename = "type", default, deserialize_with = "de::text")]
    pub kind: String,

    #[serde(default, deserialize_with = "de::text")]
    pub value: String,
}

/// A group of prizes, e.g. "Challenge prizes" or "Copilot payment".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrizeSet {
    #[serde(rename = "type", default, deserialize_with = "de::text")]
    pub kind: String,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub prizes: Vec<Prize>,
}

/// A selected phase of the challenge timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    #[serde(default, deserialize_with = "de::text")]
    pub phase_id: String,

    #[serde(default, deserialize_with = "de::integer")]
    pub duration: i64,

    /// Backend-provided phase fields (scheduled dates, names, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Phase {
    pub fn new(phase_id: impl Into<String>, duration: i64) -> Self {
        Self {
            phase_id: phase_id.into(),
            duration,
            extra: Map::new(),
        }
    }
}

/// A file attached to the challenge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Remote id, present once the upload has been registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "de::text")]
    pub file_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, size: u64) -> Self {
        Self {
            id: None,
            file_name: file_name.into(),
            size: Some(size),
            url: None,
        }
    }
}

/// The challenge record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Remote identity. Assigned by seeding from fetched details; never
    /// changed by an edit intent.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::handle")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "de::text")]
    pub name: String,

    #[serde(default, deserialize_with = "de::text")]
    pub description: String,

    #[serde(default, deserialize_with = "de::text")]
    pub private_description: String,

    #[serde(default, deserialize_with = "de::text")]
    pub track: String,

    #[serde(default, deserialize_with = "de::text")]
    pub type_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::handle")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "de::list")]
    pub tags: Vec<String>,

    #[serde(default, deserialize_with = "de::list")]
    pub groups: Vec<String>,

    #[serde(default, deserialize_with = "de::list")]
    pub terms_ids: Vec<String>,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub prize_sets: Vec<PrizeSet>,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub phases: Vec<Phase>,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub attachments: Vec<Attachment>,

    /// Member handle of the assigned copilot.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::handle")]
    pub copilot: Option<String>,

    /// Member handle of the assigned reviewer.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::handle")]
    pub reviewer: Option<String>,

    #[serde(default, deserialize_with = "de::integer")]
    pub copilot_fee: i64,

    #[serde(default, deserialize_with = "de::integer")]
    pub review_cost: i64,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de::timestamp")]
    pub start_date: Option<DateTime<Utc>>,

    /// Set when a submit was attempted on an invalid record, so field
    /// components can show their errors.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub submit_triggered: bool,

    /// Every other field, keyed by wire name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Challenge {
    /// The blank record a new challenge starts from.
    pub fn template(now: DateTime<Utc>) -> Self {
        Self {
            start_date: Some(now + Duration::hours(1)),
            ..Self::default()
        }
    }

    /// Seed a record for an existing challenge: fetched `details` are laid
    /// over the template and `attachments` replaces whatever the details
    /// carried.
    ///
    /// Fields are applied one at a time, so a value of the wrong shape only
    /// loses that field.
    pub fn seeded(details: &Value, attachments: Vec<Attachment>, now: DateTime<Utc>) -> Self {
        let mut challenge = Self::template(now);
        match details {
            Value::Object(fields) => {
                for (key, value) in fields {
                    match key.as_str() {
                        "id" => challenge.id = optional_text(value.clone()),
                        "attachments" => {}
                        _ => challenge.set_field(key, value.clone()),
                    }
                }
            }
            Value::Null => {}
            _ => tracing::warn!("challenge details are not an object, using template"),
        }
        challenge.attachments = attachments;
        challenge
    }

    /// Parse a record from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ChallengeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a record from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ChallengeError> {
        let json = std::fs::read_to_string(path).map_err(|source| ChallengeError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The status auto-save should send: the record's own, else `Draft`.
    pub fn status_or_draft(&self) -> &str {
        match self.status.as_deref() {
            Some(status) if !status.is_empty() => status,
            _ => STATUS_DRAFT,
        }
    }

    /// Remote ids of the attachments that have been registered.
    pub fn attachment_ids(&self) -> Vec<String> {
        self.attachments
            .iter()
            .filter_map(|attachment| attachment.id.clone())
            .collect()
    }

    /// Read any field by wire name. Absent fields read as `null`.
    pub fn field(&self, name: &str) -> Value {
        match name {
            "id" => to_value(&self.id),
            "name" => Value::String(self.name.clone()),
            "description" => Value::String(self.description.clone()),
            "privateDescription" => Value::String(self.private_description.clone()),
            "track" => Value::String(self.track.clone()),
            "typeId" => Value::String(self.type_id.clone()),
            "status" => to_value(&self.status),
            "tags" => to_value(&self.tags),
            "groups" => to_value(&self.groups),
            "termsIds" => to_value(&self.terms_ids),
            "prizeSets" => to_value(&self.prize_sets),
            "phases" => to_value(&self.phases),
            "attachments" => to_value(&self.attachments),
            "copilot" => to_value(&self.copilot),
            "reviewer" => to_value(&self.reviewer),
            "copilotFee" => Value::from(self.copilot_fee),
            "reviewCost" => Value::from(self.review_cost),
            "startDate" => to_value(&self.start_date),
            "submitTriggered" => Value::Bool(self.submit_triggered),
            other => self.extra.get(other).cloned().unwrap_or(Value::Null),
        }
    }

    /// Write any field by wire name.
    ///
    /// Never fails. `null` clears a field. A value whose shape does not fit
    /// a typed field leaves that field unchanged. `id` is not writable here.
    pub fn set_field(&mut self, name: &str, value: Value) {
        match name {
            "id" => tracing::debug!("ignoring write to challenge id"),
            "name" => assign_text(&mut self.name, value),
            "description" => assign_text(&mut self.description, value),
            "privateDescription" => assign_text(&mut self.private_description, value),
            "track" => assign_text(&mut self.track, value),
            "typeId" => assign_text(&mut self.type_id, value),
            "status" => self.status = optional_text(value),
            "tags" => assign_list(&mut self.tags, value),
            "groups" => assign_list(&mut self.groups, value),
            "termsIds" => assign_list(&mut self.terms_ids, value),
            "prizeSets" => assign_typed(name, &mut self.prize_sets, value),
            "phases" => assign_typed(name, &mut self.phases, value),
            "attachments" => assign_typed(name, &mut self.attachments, value),
            "copilot" => self.copilot = optional_text(value),
            "reviewer" => self.reviewer = optional_text(value),
            "copilotFee" => self.copilot_fee = integer_of(&value),
            "reviewCost" => self.review_cost = integer_of(&value),
            "startDate" => match value {
                Value::Null => self.start_date = None,
                Value::String(s) => match s.parse::<DateTime<Utc>>() {
                    Ok(date) => self.start_date = Some(date),
                    Err(e) => tracing::debug!("ignoring malformed startDate {:?}: {}", s, e),
                },
                _ => tracing::debug!("ignoring non-string startDate"),
            },
            "submitTriggered" => self.submit_triggered = value.as_bool().unwrap_or(false),
            other => {
                if value.is_null() {
                    self.extra.remove(other);
                } else {
                    self.extra.insert(other.to_string(), value);
                }
            }
        }
    }

    /// Drop a field entirely. Typed fields are reset to their empty value.
    pub fn remove_field(&mut self, name: &str) {
        self.set_field(name, Value::Null);
    }
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

fn assign_text(slot: &mut String, value: Value) {
    match value {
        Value::Null => slot.clear(),
        Value::String(s) => *slot = s,
        Value::Number(n) => *slot = n.to_string(),
        Value::Bool(b) => *slot = b.to_string(),
        _ => tracing::debug!("ignoring structured value for text field"),
    }
}

fn optional_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn assign_list(slot: &mut Vec<String>, value: Value) {
    match value {
        Value::Null => slot.clear(),
        Value::String(s) => *slot = split_list(&s),
        Value::Array(items) => {
            *slot = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        }
        _ => tracing::debug!("ignoring non-list value for list field"),
    }
}

fn assign_typed<T>(name: &str, slot: &mut T, value: Value)
where
    T: serde::de::DeserializeOwned + Default,
{
    if value.is_null() {
        *slot = T::default();
        return;
    }
    match serde_json::from_value::<T>(value) {
        Ok(parsed) => *slot = parsed,
        Err(e) => tracing::debug!("ignoring malformed value for {}: {}", name, e),
    }
}

/// Numeric reading used for currency-tagged fields: numbers pass through
/// (fractions truncated), strings go through the currency parser, anything
/// else is 0.
pub(crate) fn integer_of(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => currency::parse_integer(s, Some(currency::DOLLAR)),
        _ => 0,
    }
}

/// Split comma-delimited input, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lenient field deserializers.
mod de {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        })
    }

    pub fn handle<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(super::optional_text(Value::deserialize(deserializer)?))
    }

    pub fn list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut items = Vec::new();
        super::assign_list(&mut items, Value::deserialize(deserializer)?);
        Ok(items)
    }

    pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(super::integer_of(&Value::deserialize(deserializer)?))
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s.parse::<DateTime<Utc>>().ok(),
            _ => None,
        })
    }
}
