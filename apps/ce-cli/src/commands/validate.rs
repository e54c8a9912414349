// validate.rs — `ce validate`: report missing required fields.

use std::path::Path;

use ce_challenge::{missing_fields, Challenge};

pub fn execute(path: &Path) -> anyhow::Result<()> {
    let challenge = Challenge::load(path)?;
    let missing = check(&challenge);
    if missing.is_empty() {
        println!("{}: valid", path.display());
        return Ok(());
    }

    println!("{}: {} required field(s) missing", path.display(), missing.len());
    for field in &missing {
        println!("  - {}", field);
    }
    anyhow::bail!("challenge is not ready to save");
}

fn check(challenge: &Challenge) -> Vec<&'static str> {
    missing_fields(challenge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn complete_record_passes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("challenge.json");
        std::fs::write(
            &path,
            r#"{
                "name": "Ship it",
                "track": "DEVELOP",
                "typeId": "t-1",
                "description": "Cut the release",
                "tags": ["release"],
                "prizeSets": [{"type": "Challenge prizes", "prizes": [{"type": "money", "value": "100"}]}]
            }"#,
        )
        .unwrap();

        assert!(execute(&path).is_ok());
    }

    #[test]
    fn incomplete_record_lists_missing_fields() {
        let challenge = Challenge::from_json(r#"{"name": "Ship it", "track": "DEVELOP"}"#).unwrap();
        let missing = check(&challenge);
        assert!(missing.contains(&"description"));
        assert!(missing.contains(&"prizeSets"));
        assert!(!missing.contains(&"name"));
    }

    #[test]
    fn unreadable_record_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(execute(&dir.path().join("missing.json")).is_err());
    }
}
