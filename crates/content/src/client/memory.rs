//! In-process content repository.
//!
//! Behaves like the remote API with respect to version tokens: every write
//! produces a new token and stale tokens are rejected.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{ContentClient, RemoteFile, VersionToken};
use crate::error::ContentError;

/// A write recorded by [`MemoryContentClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub path: String,
    pub message: String,
    /// Token the write was based on (`None` for a create).
    pub base: Option<VersionToken>,
}

#[derive(Default)]
struct MemoryRepo {
    files: HashMap<String, RemoteFile>,
    commits: Vec<Commit>,
    revision: u64,
    fail_next: Option<ContentError>,
}

impl MemoryRepo {
    fn next_token(&mut self, path: &str, content: &[u8]) -> VersionToken {
        self.revision += 1;
        let mut hasher = Sha256::new();
        hasher.update(self.revision.to_be_bytes());
        hasher.update(path.as_bytes());
        hasher.update(content);
        VersionToken::new(hex::encode(hasher.finalize()))
    }
}

/// Content client backed by a shared in-memory map.
#[derive(Clone, Default)]
pub struct MemoryContentClient {
    repo: Arc<Mutex<MemoryRepo>>,
}

impl MemoryContentClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding of a file.
    #[must_use]
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.seed(path, content);
        self
    }

    /// Replace a file out-of-band, as another editor would. Returns the new token.
    pub fn seed(&self, path: &str, content: impl Into<Vec<u8>>) -> VersionToken {
        let content = content.into();
        let mut repo = self.lock();
        let token = repo.next_token(path, &content);
        repo.files.insert(
            path.to_string(),
            RemoteFile {
                content,
                token: token.clone(),
            },
        );
        token
    }

    /// Current content of a file.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().files.get(path).map(|f| f.content.clone())
    }

    /// Writes accepted so far, oldest first.
    #[must_use]
    pub fn commits(&self) -> Vec<Commit> {
        self.lock().commits.clone()
    }

    /// Make the next fetch or write fail with `error`.
    pub fn fail_next(&self, error: ContentError) {
        self.lock().fail_next = Some(error);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryRepo> {
        self.repo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ContentClient for MemoryContentClient {
    async fn fetch(&self, path: &str) -> Result<RemoteFile, ContentError> {
        let mut repo = self.lock();
        if let Some(err) = repo.fail_next.take() {
            return Err(err);
        }
        repo.files
            .get(path)
            .cloned()
            .ok_or_else(|| ContentError::NotFound(path.to_string()))
    }

    async fn write(
        &self,
        path: &str,
        content: &[u8],
        token: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken, ContentError> {
        let mut repo = self.lock();
        if let Some(err) = repo.fail_next.take() {
            return Err(err);
        }

        let current = repo.files.get(path).map(|f| f.token.clone());
        match (current.as_ref(), token) {
            (None, None) => {}
            (Some(current), Some(expected)) if current == expected => {}
            _ => return Err(ContentError::Conflict(path.to_string())),
        }

        let new_token = repo.next_token(path, content);
        repo.files.insert(
            path.to_string(),
            RemoteFile {
                content: content.to_vec(),
                token: new_token.clone(),
            },
        );
        repo.commits.push(Commit {
            path: path.to_string(),
            message: message.to_string(),
            base: token.cloned(),
        });
        Ok(new_token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let client = MemoryContentClient::new();
        assert_eq!(
            client.fetch("a.csv").await,
            Err(ContentError::NotFound("a.csv".to_string()))
        );
    }

    #[tokio::test]
    async fn test_create_then_update() {
        let client = MemoryContentClient::new();
        let first = client.write("a.csv", b"one", None, "create").await.unwrap();
        let second = client
            .write("a.csv", b"two", Some(&first), "update")
            .await
            .unwrap();
        assert_ne!(first, second);

        let fetched = client.fetch("a.csv").await.unwrap();
        assert_eq!(fetched.content, b"two");
        assert_eq!(fetched.token, second);
        assert_eq!(client.commits().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_token_conflicts() {
        let client = MemoryContentClient::new();
        let first = client.write("a.csv", b"one", None, "create").await.unwrap();
        client.seed("a.csv", "edited elsewhere");

        let result = client.write("a.csv", b"two", Some(&first), "update").await;
        assert!(result.unwrap_err().is_conflict());
        assert_eq!(client.file("a.csv").unwrap(), b"edited elsewhere");
    }

    #[tokio::test]
    async fn test_create_over_existing_conflicts() {
        let client = MemoryContentClient::new().with_file("a.csv", "present");
        let result = client.write("a.csv", b"new", None, "create").await;
        assert!(result.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_fail_next_is_consumed() {
        let client = MemoryContentClient::new().with_file("a.csv", "x");
        client.fail_next(ContentError::Transient("down".to_string()));
        assert!(client.fetch("a.csv").await.is_err());
        assert!(client.fetch("a.csv").await.is_ok());
    }
}
