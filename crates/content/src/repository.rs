//! Process-wide handle on the content repository.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use tokio::sync::Mutex;

use crate::client::ContentClient;
use crate::collection::Collection;
use crate::store::{RecordStore, Snapshot};

/// Shared content client plus one save gate per collection.
///
/// Cheap to clone; clones share the gates, so every [`RecordStore`] created
/// through the same repository serialises its saves with the others.
#[derive(Clone)]
pub struct Repository {
    inner: Arc<RepositoryInner>,
}

struct RepositoryInner {
    client: Arc<dyn ContentClient>,
    gates: std::sync::Mutex<HashMap<&'static str, Arc<Mutex<()>>>>,
}

impl Repository {
    #[must_use]
    pub fn new(client: Arc<dyn ContentClient>) -> Self {
        Self {
            inner: Arc::new(RepositoryInner {
                client,
                gates: std::sync::Mutex::new(HashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn client(&self) -> &Arc<dyn ContentClient> {
        &self.inner.client
    }

    /// An unloaded store for collection `C`.
    #[must_use]
    pub fn store<C: Collection>(&self) -> RecordStore<C> {
        RecordStore::new(self.inner.client.clone(), self.gate(C::PATH))
    }

    /// A loaded store resumed from a snapshot.
    #[must_use]
    pub fn store_from<C: Collection>(&self, snapshot: Snapshot<C::Data>) -> RecordStore<C> {
        RecordStore::from_snapshot(self.inner.client.clone(), self.gate(C::PATH), snapshot)
    }

    fn gate(&self, path: &'static str) -> Arc<Mutex<()>> {
        self.inner
            .gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path)
            .or_default()
            .clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::client::MemoryContentClient;
    use crate::collection::{Categories, Products};
    use crate::store::StoreState;

    #[test]
    fn test_gate_shared_per_collection() {
        let repo = Repository::new(Arc::new(MemoryContentClient::new()));
        assert!(Arc::ptr_eq(&repo.gate(Products::PATH), &repo.clone().gate(Products::PATH)));
        assert!(!Arc::ptr_eq(&repo.gate(Products::PATH), &repo.gate(Categories::PATH)));
    }

    #[tokio::test]
    async fn test_store_from_snapshot() {
        let repo = Repository::new(Arc::new(MemoryContentClient::new()));
        let mut store = repo.store::<Categories>();
        store.load().await.unwrap();

        let resumed = repo.store_from::<Categories>(store.snapshot().unwrap());
        assert_eq!(resumed.state(), StoreState::Loaded);
        assert_eq!(resumed.data(), store.data());
    }
}
