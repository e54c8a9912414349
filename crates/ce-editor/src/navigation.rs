//! Navigation context: reading and extending the current location's query.

use std::sync::{Mutex, MutexGuard, PoisonError};

use url::Url;

/// The embedding layer's navigation surface.
///
/// The editor reads a query parameter to recover a draft id after a
/// reload and appends one once a draft is created, without a full page
/// load.
pub trait Navigator: Send + Sync {
    /// Current value of a query parameter.
    fn query_param(&self, name: &str) -> Option<String>;

    /// Set a query parameter on the current location, keeping the others.
    fn push_query(&self, name: &str, value: &str);
}

/// A navigator over an in-memory location.
pub struct MemoryNavigator {
    location: Mutex<Url>,
}

impl MemoryNavigator {
    /// Start at `location`, a path with an optional query
    /// (e.g., "/challenges/new?projectId=7").
    pub fn new(location: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse("http://localhost/")?.join(location)?;
        Ok(Self {
            location: Mutex::new(url),
        })
    }

    /// The path and query as the embedding layer would show them.
    pub fn location(&self) -> String {
        let url = self.url();
        match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        }
    }

    fn url(&self) -> MutexGuard<'_, Url> {
        self.location.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for MemoryNavigator {
    fn query_param(&self, name: &str) -> Option<String> {
        self.url()
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    fn push_query(&self, name: &str, value: &str) {
        let mut url = self.url();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != name)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(name, value);
        tracing::debug!("navigation: {}", url.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_existing_query_param() {
        let nav = MemoryNavigator::new("/challenges/new?challengeId=c-9").unwrap();
        assert_eq!(nav.query_param("challengeId").as_deref(), Some("c-9"));
        assert_eq!(nav.query_param("other"), None);
    }

    #[test]
    fn push_keeps_other_params() {
        let nav = MemoryNavigator::new("/challenges/new?projectId=7").unwrap();
        nav.push_query("challengeId", "c-1");
        assert_eq!(nav.location(), "/challenges/new?projectId=7&challengeId=c-1");
    }

    #[test]
    fn push_replaces_same_param() {
        let nav = MemoryNavigator::new("/challenges/new?challengeId=old").unwrap();
        nav.push_query("challengeId", "new");
        assert_eq!(nav.location(), "/challenges/new?challengeId=new");
    }

    #[test]
    fn bare_path_has_no_query() {
        let nav = MemoryNavigator::new("/challenges/new").unwrap();
        assert_eq!(nav.location(), "/challenges/new");
        nav.push_query("challengeId", "c-2");
        assert_eq!(nav.query_param("challengeId").as_deref(), Some("c-2"));
    }
}
