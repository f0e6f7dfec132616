use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::chat::api::{ChatApi, NameKind};

/// Lazily-populated display names for one realtime session.
///
/// Successful lookups are kept for the life of the cache; failed ones are
/// not, so the next message from the same id retries. Two concurrent misses
/// for the same id may both hit the directory; the second insert overwrites
/// the first with the same name.
pub struct NameCache {
    api: Arc<dyn ChatApi>,
    users: RwLock<HashMap<String, String>>,
    channels: RwLock<HashMap<String, String>>,
}

impl NameCache {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            users: RwLock::new(HashMap::new()),
            channels: RwLock::new(HashMap::new()),
        }
    }

    fn names(&self, kind: NameKind) -> &RwLock<HashMap<String, String>> {
        match kind {
            NameKind::User => &self.users,
            NameKind::Channel => &self.channels,
        }
    }

    /// Resolve an id to its display name, or an empty string if the lookup fails
    pub async fn resolve(&self, kind: NameKind, id: &str) -> String {
        let cached = self.names(kind).read().await.get(id).cloned();
        if let Some(name) = cached {
            return name;
        }

        match self.api.lookup_name(kind, id).await {
            Ok(name) => {
                self.names(kind)
                    .write()
                    .await
                    .insert(id.to_string(), name.clone());
                name
            }
            Err(err) => {
                warn!("Failed to resolve {kind} name for {id}: {err}");
                String::new()
            }
        }
    }

    /// Cached name, without looking it up
    pub async fn cached(&self, kind: NameKind, id: &str) -> Option<String> {
        self.names(kind).read().await.get(id).cloned()
    }
}
