use chrono::{DateTime, Utc};
use serde_json::Value;

/// Last successful payload of one remote operation.
///
/// Only ever replaced on success; a failed attempt leaves the previous
/// payload in place.
#[derive(Debug, Clone)]
pub struct RemoteResult<T> {
    latest: Option<(T, DateTime<Utc>)>,
}

impl<T> RemoteResult<T> {
    pub fn empty() -> Self {
        Self { latest: None }
    }

    pub fn replace(&mut self, value: T) {
        self.latest = Some((value, Utc::now()));
    }

    pub fn get(&self) -> Option<&T> {
        self.latest.as_ref().map(|(v, _)| v)
    }

    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.latest.as_ref().map(|(_, at)| *at)
    }
}

impl<T> Default for RemoteResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl RemoteResult<Value> {
    /// Pretty JSON for verbatim display.
    pub fn pretty(&self) -> Option<String> {
        self.get()
            .map(|v| serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()))
    }
}

/// Inference results from the backend. The two slots are independent.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    pub crops: RemoteResult<Value>,
    pub disease: RemoteResult<Value>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn starts_empty() {
        let store = ResultStore::new();
        assert!(store.crops.get().is_none());
        assert!(store.disease.get().is_none());
        assert!(store.disease.received_at().is_none());
    }

    #[test]
    fn replace_keeps_latest_only() {
        let mut store = ResultStore::new();
        store.crops.replace(json!({"crops": ["rice"]}));
        store.crops.replace(json!({"crops": ["maize", "millet"]}));
        assert_eq!(store.crops.get(), Some(&json!({"crops": ["maize", "millet"]})));
        assert!(store.crops.received_at().is_some());
    }

    #[test]
    fn slots_are_independent() {
        let mut store = ResultStore::new();
        store.disease.replace(json!({"label": "leaf blight"}));
        assert!(store.disease.get().is_some());
        assert!(store.crops.get().is_none());
    }

    #[test]
    fn pretty_renders_payload() {
        let mut slot = RemoteResult::empty();
        slot.replace(json!({"label": "healthy"}));
        let text = slot.pretty().unwrap();
        assert!(text.contains("\"label\": \"healthy\""));
    }
}
