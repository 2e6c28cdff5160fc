//! Record Store: load, mutate and save one record collection.
//!
//! A store holds a working copy of the collection, the last committed copy,
//! and the version token the committed copy was read at. Saves are a
//! whole-file compare-and-swap on that token.
//!
//! ```text
//! Unloaded --load--> Loaded --mutate--> Dirty --save--> Saving --ok--> Loaded
//!                                                         |
//!                                                         +--err--> Loaded (reverted)
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::client::{ContentClient, VersionToken};
use crate::collection::Collection;
use crate::error::{ContentError, StoreError};

/// Lifecycle state of a [`RecordStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Never loaded, or the last load failed.
    Unloaded,
    /// Working copy equals the committed copy.
    Loaded,
    /// Working copy has uncommitted edits.
    Dirty,
    /// A write is in flight.
    Saving,
}

/// A committed collection plus the version it was read or written at.
///
/// `token` is `None` when the file does not exist yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub data: T,
    pub token: Option<VersionToken>,
}

/// Load/mutate/save access to one collection.
pub struct RecordStore<C: Collection> {
    client: Arc<dyn ContentClient>,
    gate: Arc<Mutex<()>>,
    state: StoreState,
    data: C::Data,
    committed: C::Data,
    token: Option<VersionToken>,
    _collection: PhantomData<C>,
}

impl<C: Collection> RecordStore<C> {
    /// Create an unloaded store.
    ///
    /// `gate` serialises saves; every store for the same collection in a
    /// process must share it.
    #[must_use]
    pub fn new(client: Arc<dyn ContentClient>, gate: Arc<Mutex<()>>) -> Self {
        Self {
            client,
            gate,
            state: StoreState::Unloaded,
            data: C::Data::default(),
            committed: C::Data::default(),
            token: None,
            _collection: PhantomData,
        }
    }

    /// Create a loaded store from a snapshot carried between requests.
    #[must_use]
    pub fn from_snapshot(
        client: Arc<dyn ContentClient>,
        gate: Arc<Mutex<()>>,
        snapshot: Snapshot<C::Data>,
    ) -> Self {
        Self {
            client,
            gate,
            state: StoreState::Loaded,
            data: snapshot.data.clone(),
            committed: snapshot.data,
            token: snapshot.token,
            _collection: PhantomData,
        }
    }

    /// Fetch and decode the collection, discarding any local edits.
    ///
    /// A missing file yields the collection's default contents and no token,
    /// so the next save creates the file.
    ///
    /// # Errors
    ///
    /// Any other fetch or decode failure is returned and leaves the store
    /// empty and `Unloaded`.
    #[instrument(skip(self), fields(collection = C::NAME))]
    pub async fn load(&mut self) -> Result<(), StoreError> {
        match self.client.fetch(C::PATH).await {
            Ok(file) => match C::decode(&file.content) {
                Ok(data) => {
                    debug!(token = %file.token, "Loaded collection");
                    self.reset(data, Some(file.token));
                    Ok(())
                }
                Err(e) => {
                    warn!(error = %e, "Collection file could not be decoded");
                    self.unload();
                    Err(e.into())
                }
            },
            Err(ContentError::NotFound(_)) => {
                info!("Collection file absent, starting from defaults");
                self.reset(C::missing(), None);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load collection");
                self.unload();
                Err(e.into())
            }
        }
    }

    /// Apply an in-memory edit to the working copy.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotLoaded` if the store was never loaded.
    pub fn mutate<R>(&mut self, edit: impl FnOnce(&mut C::Data) -> R) -> Result<R, StoreError> {
        if self.state == StoreState::Unloaded {
            return Err(StoreError::NotLoaded(C::NAME));
        }
        let result = edit(&mut self.data);
        self.state = if self.data == self.committed {
            StoreState::Loaded
        } else {
            StoreState::Dirty
        };
        Ok(result)
    }

    /// Encode the working copy and write it with the held token.
    ///
    /// On success the working copy becomes the committed copy. On failure the
    /// working copy is reverted to the committed copy; a `Conflict` means the
    /// caller must reload before editing again.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotLoaded` for an unloaded store, or the encode or
    /// write failure.
    #[instrument(skip(self), fields(collection = C::NAME, create = self.token.is_none()))]
    pub async fn save(&mut self, message: &str) -> Result<(), StoreError> {
        if self.state == StoreState::Unloaded {
            return Err(StoreError::NotLoaded(C::NAME));
        }

        let _gate = self.gate.lock().await;
        self.state = StoreState::Saving;

        let written = match C::encode(&self.data) {
            Ok(bytes) => self
                .client
                .write(C::PATH, &bytes, self.token.as_ref(), message)
                .await
                .map_err(StoreError::from),
            Err(e) => Err(e.into()),
        };

        match written {
            Ok(token) => {
                info!(token = %token, "Saved collection");
                self.committed = self.data.clone();
                self.token = Some(token);
                self.state = StoreState::Loaded;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to save collection, reverting local edits");
                self.data = self.committed.clone();
                self.state = StoreState::Loaded;
                Err(e)
            }
        }
    }

    /// Working copy.
    #[must_use]
    pub const fn data(&self) -> &C::Data {
        &self.data
    }

    /// Last committed copy.
    #[must_use]
    pub const fn committed(&self) -> &C::Data {
        &self.committed
    }

    #[must_use]
    pub const fn state(&self) -> StoreState {
        self.state
    }

    #[must_use]
    pub const fn token(&self) -> Option<&VersionToken> {
        self.token.as_ref()
    }

    /// The committed copy and its token, or `None` if unloaded.
    #[must_use]
    pub fn snapshot(&self) -> Option<Snapshot<C::Data>> {
        (self.state != StoreState::Unloaded).then(|| Snapshot {
            data: self.committed.clone(),
            token: self.token.clone(),
        })
    }

    fn reset(&mut self, data: C::Data, token: Option<VersionToken>) {
        self.committed = data.clone();
        self.data = data;
        self.token = token;
        self.state = StoreState::Loaded;
    }

    fn unload(&mut self) {
        self.data = C::Data::default();
        self.committed = C::Data::default();
        self.token = None;
        self.state = StoreState::Unloaded;
    }
}
