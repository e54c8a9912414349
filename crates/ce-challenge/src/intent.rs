// intent.rs — Edit intents and the pure applicator over them.
//
// Every form callback is expressed as an `Intent`. `apply()` takes the
// current record by reference and returns a new one; the input is never
// modified. Applicators are total: malformed input resolves to a safe
// default (a cleared value, 0, or no change) and never errors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::challenge::{split_list, Attachment, Challenge, Phase};
use crate::currency;

/// Checkbox group whose members may be checked together.
pub const MULTI_SELECT_GROUP: &str = "terms";

/// Checkbox group that cannot be unchecked, only switched.
pub const REVIEW_TYPE_GROUP: &str = "reviewType";

/// An option picked from a select input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub key: String,
    pub name: String,
}

/// How a legacy `prizes[index].amount` input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountKind {
    Text,
    Integer,
}

/// A change to one property of a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseUpdate {
    /// New duration; negative values clamp to 0.
    Duration(i64),
    PhaseId(String),
}

/// One edit made through the form.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Set a top-level field to a value (text inputs, selects, editors).
    SetField { field: String, value: Value },

    /// Set a currency-tagged numeric field from raw input.
    SetCurrency { field: String, raw: String },

    /// Set `field.key`.
    SetSubField {
        field: String,
        key: String,
        value: Value,
    },

    /// Set `field[index].key`.
    SetIndexedSubField {
        field: String,
        index: usize,
        key: String,
        value: Value,
    },

    /// Set `field.key` to an integer parsed from raw input.
    SetNumericSubField {
        field: String,
        key: String,
        raw: String,
        currency: bool,
    },

    /// Set the legacy `prizes[index].amount` and remember the focused row.
    SetPrizeAmount {
        index: usize,
        raw: String,
        kind: AmountKind,
    },

    /// Picked an option for a nested field: `field[option.key] = option.name`,
    /// or `field[index][option.key]` when `index` is given.
    SelectOption {
        field: String,
        option: SelectOption,
        index: Option<usize>,
    },

    /// Toggle a checkbox.
    ///
    /// Without `group` the checkbox is a top-level boolean named `id`.
    /// With `group` and `index`, it sets `group[index].check`. With `group`
    /// only, it sets `group.id` and the top-level `id`; unless
    /// `multi_select` is set (or the group is `terms`) all sibling toggles
    /// are cleared first.
    ToggleCheckbox {
        id: String,
        checked: bool,
        group: Option<String>,
        index: Option<usize>,
        multi_select: bool,
    },

    /// Replace a multi-valued field from comma-delimited input.
    SetMultiValue { field: String, raw: Option<String> },

    /// A change from one of the composite field components (track, copilot,
    /// reviewer, phases, prizes, fees). These are the edits that can start
    /// a remote draft.
    SetOther { field: String, value: Value },

    /// Replace the phase list.
    SetPhases(Vec<Phase>),

    /// Change one phase.
    UpdatePhase { index: usize, update: PhaseUpdate },

    RemovePhase(usize),

    AddAttachments(Vec<Attachment>),

    RemoveAttachment { file_name: String },

    /// Flag a failed submit so field components render their errors.
    MarkSubmitTriggered,
}

impl Intent {
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Intent::SetField {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn other(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Intent::SetOther {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether this edit should schedule an auto-save.
    pub fn is_auto_savable(&self) -> bool {
        !matches!(self, Intent::MarkSubmitTriggered)
    }

    /// Whether this edit should check for draft creation right away.
    pub fn may_create_draft(&self) -> bool {
        matches!(self, Intent::SetOther { .. } | Intent::SetPhases(_))
    }
}

/// Apply `intent` to `challenge`, returning the edited copy.
pub fn apply(challenge: &Challenge, intent: Intent) -> Challenge {
    let mut next = challenge.clone();
    match intent {
        Intent::SetField { field, value } => next.set_field(&field, value),

        Intent::SetCurrency { field, raw } => {
            let amount = currency::parse_integer(&raw, Some(currency::DOLLAR));
            next.set_field(&field, Value::from(amount));
        }

        Intent::SetSubField { field, key, value } => set_sub_field(&mut next, &field, &key, value),

        Intent::SetIndexedSubField {
            field,
            index,
            key,
            value,
        } => set_indexed_sub_field(&mut next, &field, index, &key, value),

        Intent::SetNumericSubField {
            field,
            key,
            raw,
            currency: is_currency,
        } => {
            let symbol = is_currency.then_some(currency::DOLLAR);
            let amount = currency::parse_integer(&raw, symbol);
            set_sub_field(&mut next, &field, &key, Value::from(amount));
        }

        Intent::SetPrizeAmount { index, raw, kind } => {
            let amount = match kind {
                AmountKind::Text => Value::String(raw.trim().to_string()),
                AmountKind::Integer => Value::from(currency::parse_integer(&raw, None)),
            };
            set_indexed_sub_field(&mut next, "prizes", index, "amount", amount);
            next.set_field("focusIndex", Value::from(index as u64));
        }

        Intent::SelectOption {
            field,
            option,
            index,
        } => {
            let value = Value::String(option.name);
            match index {
                Some(index) => set_indexed_sub_field(&mut next, &field, index, &option.key, value),
                None => set_sub_field(&mut next, &field, &option.key, value),
            }
        }

        Intent::ToggleCheckbox {
            id,
            checked,
            group,
            index,
            multi_select,
        } => toggle_checkbox(&mut next, &id, checked, group.as_deref(), index, multi_select),

        Intent::SetMultiValue { field, raw } => {
            let values = raw.as_deref().map(split_list).unwrap_or_default();
            next.set_field(&field, Value::from(values));
            if field == "termsIds" {
                // `terms` is the older shape of `termsIds`.
                next.remove_field("terms");
            }
        }

        Intent::SetOther { field, value } => set_other(&mut next, &field, value),

        Intent::SetPhases(phases) => next.phases = phases,

        Intent::UpdatePhase { index, update } => {
            if let Some(phase) = next.phases.get_mut(index) {
                match update {
                    PhaseUpdate::Duration(duration) => phase.duration = duration.max(0),
                    PhaseUpdate::PhaseId(id) => phase.phase_id = id,
                }
            }
        }

        Intent::RemovePhase(index) => {
            if index < next.phases.len() {
                next.phases.remove(index);
            }
        }

        Intent::AddAttachments(files) => next.attachments.extend(files),

        Intent::RemoveAttachment { file_name } => {
            next.attachments
                .retain(|attachment| attachment.file_name != file_name);
        }

        Intent::MarkSubmitTriggered => next.submit_triggered = true,
    }
    next
}

fn set_sub_field(challenge: &mut Challenge, field: &str, key: &str, value: Value) {
    let mut object = match challenge.field(field) {
        Value::Object(object) => object,
        _ => Map::new(),
    };
    object.insert(key.to_string(), value);
    challenge.set_field(field, Value::Object(object));
}

fn set_indexed_sub_field(challenge: &mut Challenge, field: &str, index: usize, key: &str, value: Value) {
    let mut items = match challenge.field(field) {
        Value::Array(items) => items,
        _ => return,
    };
    let Some(Value::Object(item)) = items.get_mut(index) else {
        return;
    };
    item.insert(key.to_string(), value);
    challenge.set_field(field, Value::Array(items));
}

fn toggle_checkbox(
    challenge: &mut Challenge,
    id: &str,
    checked: bool,
    group: Option<&str>,
    index: Option<usize>,
    multi_select: bool,
) {
    let Some(group) = group.filter(|g| !g.is_empty()) else {
        challenge.set_field(id, Value::Bool(checked));
        return;
    };
    if group == REVIEW_TYPE_GROUP && !checked {
        return;
    }
    if let Some(index) = index {
        set_indexed_sub_field(challenge, group, index, "check", Value::Bool(checked));
        return;
    }

    let mut toggles = match challenge.field(group) {
        Value::Object(toggles) => toggles,
        _ => Map::new(),
    };
    if !multi_select && group != MULTI_SELECT_GROUP {
        for value in toggles.values_mut() {
            *value = Value::Bool(false);
        }
    }
    toggles.insert(id.to_string(), Value::Bool(checked));
    challenge.set_field(group, Value::Object(toggles));
    // The option is also mirrored as a top-level flag.
    challenge.set_field(id, Value::Bool(checked));
}

fn set_other(challenge: &mut Challenge, field: &str, value: Value) {
    match field {
        // Picking the current copilot again unassigns them.
        "copilot" if value.as_str().is_some() && challenge.copilot.as_deref() == value.as_str() => {
            challenge.copilot = None;
        }
        "phases" => challenge.phases = phases_from_selection(value),
        _ => challenge.set_field(field, value),
    }
}

/// Map phase selections (`{id, duration}` objects from the schedule
/// component) to phases. Entries without an id are skipped.
fn phases_from_selection(value: Value) -> Vec<Phase> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let id = item
                .get("id")
                .or_else(|| item.get("phaseId"))
                .and_then(Value::as_str)?;
            let duration = item.get("duration").and_then(Value::as_i64).unwrap_or(0);
            Some(Phase::new(id, duration.max(0)))
        })
        .collect()
}
