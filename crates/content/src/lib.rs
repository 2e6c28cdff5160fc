//! Glint Content - Remote record files and the record store.
//!
//! The shop keeps its data as plain files in a hosted source-control
//! repository. This crate wraps that repository behind two layers:
//!
//! - [`client`] - the Remote Content Client: fetch a file with its version
//!   token, write a file conditioned on a prior token
//! - [`store`] - the Record Store: load / mutate / save a typed collection
//!   with optimistic concurrency
//!
//! # Example
//!
//! ```rust,ignore
//! use glint_content::{GitHubContentClient, Repository, collection::Products};
//!
//! let client = GitHubContentClient::new(&config)?;
//! let repository = Repository::new(Arc::new(client));
//!
//! let mut products = repository.store::<Products>();
//! products.load().await?;
//! products.mutate(|rows| rows.retain(|p| p.stock > 0))?;
//! products.save("Remove sold-out products").await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod repository;
pub mod store;

pub use client::{
    Commit, ContentClient, GitHubContentClient, MemoryContentClient, RemoteFile, VersionToken,
};
pub use collection::{Categories, Collection, IMAGE_DIR, Products, image_path};
pub use config::{ConfigError, ContentConfig};
pub use error::{ContentError, StoreError};
pub use repository::Repository;
pub use store::{RecordStore, Snapshot, StoreState};
