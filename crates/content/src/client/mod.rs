//! Remote Content Client.
//!
//! A content client reads and writes whole files in a hosted repository.
//! Every file carries a [`VersionToken`]; writes that name a stale token are
//! rejected with [`ContentError::Conflict`] and are never retried here.
//!
//! # Implementations
//!
//! - [`GitHubContentClient`] - the GitHub "contents" REST API
//! - [`MemoryContentClient`] - an in-process repository for tests and local runs

mod github;
mod memory;

pub use github::GitHubContentClient;
pub use memory::{Commit, MemoryContentClient};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Opaque identifier of a remote file's current version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fetched file: decoded bytes plus the version they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: Vec<u8>,
    pub token: VersionToken,
}

/// Read/write access to files in a remote repository.
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// Fetch a file's decoded content and current version token.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the path does not exist
    /// - `Transient` on network failure, timeout, or server error
    /// - `Auth` if the credential is rejected
    async fn fetch(&self, path: &str) -> Result<RemoteFile, ContentError>;

    /// Create (`token` is `None`) or update (`token` is the version last
    /// fetched) a file, recording `message` as the commit message.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the token is stale, or if creating over an existing file
    /// - `Transient` / `Auth` as for [`fetch`](Self::fetch)
    async fn write(
        &self,
        path: &str,
        content: &[u8],
        token: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken, ContentError>;
}
