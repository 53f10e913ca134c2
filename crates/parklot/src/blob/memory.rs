//! In-memory [`BlobStore`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{validate_object_path, BlobStore, StoredBlob, UrlSigner};
use crate::error::{Error, Result};

/// Blob storage kept in a hash map.
///
/// Writes can be made to fail on demand to exercise error paths.
#[derive(Debug)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, StoredBlob>>,
    signer: UrlSigner,
    fail_writes: AtomicBool,
}

impl MemoryBlobStore {
    /// Create an empty store signing URLs under `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            signer: UrlSigner::from_secret(base_url, "memory-blob-store"),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `put` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether the store holds no objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StoredBlob>>> {
        self.objects
            .lock()
            .map_err(|_| Error::internal("memory blob store lock poisoned"))
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("http://localhost/blobs")
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        validate_object_path(path).map_err(|e| Error::invalid(e.to_string()))?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::BlobWrite {
                path: path.to_string(),
                source: std::io::Error::other("injected write failure"),
            });
        }
        self.lock()?.insert(
            path.to_string(),
            StoredBlob {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<StoredBlob>> {
        Ok(self.lock()?.get(path).cloned())
    }

    fn signer(&self) -> &UrlSigner {
        &self.signer
    }
}
