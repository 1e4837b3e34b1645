//! # attest-store
//!
//! The blob-store seam of the Attest pipeline plus its concrete backends.
//!
//! The pipeline only ever talks to [`BlobStore`]: bytes go in under a caller
//! chosen key, a retrieval URL comes out. Distinct keys may be written
//! concurrently; overwrite-or-reuse semantics for an existing key belong to
//! the store, not to the pipeline.

use async_trait::async_trait;

use attest_core::Result;

mod fs;
mod http;
mod memory;

pub use fs::FsBlobStore;
pub use http::HttpBlobStore;
pub use memory::{MemoryBlobStore, StoredBlob};

/// Content storage that accepts bytes under a key and returns a retrieval URL
///
/// Implementations must be safe to call concurrently for distinct keys and
/// are assumed durable once `put` returns.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` with the given content type, returning the
    /// URL the blob can be retrieved from.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String>;
}
