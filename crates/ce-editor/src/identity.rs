// identity.rs — Which remote challenge the editor is talking to.

/// Query parameter that carries a draft id across reloads.
pub const CHALLENGE_ID_PARAM: &str = "challengeId";

/// Resolve the remote id from its three possible sources.
///
/// Precedence: an explicit id from the editing context, then the id of a
/// draft created during this session, then an id recovered from the
/// navigation query. Empty strings count as absent.
pub fn resolve_challenge_id(
    explicit: Option<&str>,
    draft: Option<&str>,
    query: Option<&str>,
) -> Option<String> {
    [explicit, draft, query]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_id_wins() {
        assert_eq!(
            resolve_challenge_id(Some("c-1"), Some("d-1"), Some("q-1")).as_deref(),
            Some("c-1")
        );
    }

    #[test]
    fn draft_beats_query() {
        assert_eq!(
            resolve_challenge_id(None, Some("d-1"), Some("q-1")).as_deref(),
            Some("d-1")
        );
        assert_eq!(resolve_challenge_id(None, None, Some("q-1")).as_deref(), Some("q-1"));
    }

    #[test]
    fn empty_sources_are_skipped() {
        assert_eq!(resolve_challenge_id(Some(""), Some("  "), Some("q-1")).as_deref(), Some("q-1"));
        assert_eq!(resolve_challenge_id(None, None, None), None);
    }
}
