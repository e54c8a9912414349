// validation.rs — The gate in front of auto-save and launch.
//
// Validation only answers "is this record complete enough to submit?".
// It never touches persisted state; callers decide what to do with the
// answer (skip the auto-save, keep the launch dialog closed, mark the
// record `submitTriggered` so field errors render).

use crate::challenge::Challenge;

/// Fields that must be non-empty before a record may be saved or launched.
pub const REQUIRED_FIELDS: [&str; 6] = ["track", "typeId", "name", "description", "tags", "prizeSets"];

/// Required fields that are currently empty, in `REQUIRED_FIELDS` order.
pub fn missing_fields(challenge: &Challenge) -> Vec<&'static str> {
    let checks = [
        challenge.track.is_empty(),
        challenge.type_id.is_empty(),
        challenge.name.is_empty(),
        challenge.description.is_empty(),
        challenge.tags.is_empty(),
        challenge.prize_sets.is_empty(),
    ];
    REQUIRED_FIELDS
        .iter()
        .zip(checks)
        .filter_map(|(field, empty)| empty.then_some(*field))
        .collect()
}

/// True when every required field is present and non-empty.
pub fn is_valid(challenge: &Challenge) -> bool {
    missing_fields(challenge).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::{Prize, PrizeSet};

    fn complete() -> Challenge {
        Challenge {
            track: "DEVELOP".to_string(),
            type_id: "t-1".to_string(),
            name: "Build it".to_string(),
            description: "Details".to_string(),
            tags: vec!["x".to_string()],
            prize_sets: vec![PrizeSet {
                kind: "Challenge prizes".to_string(),
                prizes: vec![Prize {
                    kind: "money".to_string(),
                    value: "100".to_string(),
                }],
            }],
            ..Challenge::default()
        }
    }

    #[test]
    fn complete_record_is_valid() {
        assert!(is_valid(&complete()));
        assert!(missing_fields(&complete()).is_empty());
    }

    #[test]
    fn empty_tags_fail() {
        let mut challenge = complete();
        challenge.tags.clear();
        assert!(!is_valid(&challenge));
        assert_eq!(missing_fields(&challenge), vec!["tags"]);
    }

    #[test]
    fn each_required_field_is_checked() {
        let blank = Challenge::default();
        assert_eq!(missing_fields(&blank), REQUIRED_FIELDS.to_vec());
    }

    #[test]
    fn optional_fields_do_not_matter() {
        let mut challenge = complete();
        challenge.groups.clear();
        challenge.phases.clear();
        challenge.copilot = None;
        assert!(is_valid(&challenge));
    }
}
