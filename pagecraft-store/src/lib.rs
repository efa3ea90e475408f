//! Content store for Pagecraft.
//!
//! Fetches the stored overrides of a page through a [`PersistenceGateway`]
//! and keeps them cached so every field binding on the page reads the same
//! tree without refetching.
//!
//! # Components
//!
//! - **Gateway**: the async seam to whatever backend persists content
//! - **Client**: the per-page cache, with mount-scoped fetches that are
//!   discarded when the page is left mid-read
//! - **Memory**: an in-process gateway for tests and local previews
//!
//! The client never surfaces a fetch error to its caller. A failed read
//! falls back to the last cached tree (or an empty one) and records a
//! diagnostic string instead.
//!
//! # Example
//!
//! ```
//! use pagecraft_store::{ContentStoreClient, MemoryGateway, StoreConfig};
//! use std::sync::Arc;
//!
//! let gateway = Arc::new(MemoryGateway::new());
//! let client = ContentStoreClient::new(gateway, StoreConfig::default());
//! assert!(client.tree("home").is_empty());
//! ```

mod client;
mod config;
mod error;
mod gateway;
pub mod memory;

pub use client::{ContentStoreClient, PageContent, PageMount, PageStatus};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use gateway::{BatchResult, EntryFailure, EntryOutcome, EntryStatus, PersistenceGateway};
pub use memory::MemoryGateway;
