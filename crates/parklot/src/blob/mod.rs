//! Blob storage for entry photos.
//!
//! Photos are written once under a path derived from the car's unique code
//! and handed out as signed, long-lived read URLs.

pub mod fs;
pub mod memory;
pub mod signing;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use signing::{SignatureError, UrlSigner};

/// An object read back from blob storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Raw object bytes.
    pub bytes: Vec<u8>,
    /// Content type recorded at write time.
    pub content_type: String,
}

/// Metadata written alongside each object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMeta {
    /// MIME type of the object.
    pub content_type: String,
    /// Size of the object in bytes.
    pub size: u64,
    /// When the object was written.
    pub stored_at: DateTime<Utc>,
}

/// Storage contract for entry photos.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Write an object, replacing any existing one at `path`.
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<()>;

    /// Read an object. Returns `None` if nothing is stored at `path`.
    async fn get(&self, path: &str) -> Result<Option<StoredBlob>>;

    /// The signer used to mint and check read URLs.
    fn signer(&self) -> &UrlSigner;

    /// A read URL for `path` that stays valid until `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a valid object path.
    fn signed_url(&self, path: &str, expires_at: DateTime<Utc>) -> Result<String> {
        self.signer().sign(path, expires_at)
    }
}

/// Reject object paths that could escape the store root.
pub(crate) fn validate_object_path(path: &str) -> std::result::Result<(), SignatureError> {
    if path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(SignatureError::InvalidPath);
    }
    Ok(())
}
