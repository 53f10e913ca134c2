//! Signed read URLs for stored blobs.
//!
//! A URL carries its expiry (unix seconds) and a blake3 keyed hash over
//! `path\nexpires`. Only holders of the signing key can mint one, and any
//! edit to the path or expiry invalidates it.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::{Error, Result};

/// Context string for deriving the signing key from a configured secret.
const KEY_CONTEXT: &str = "parklot 2024-06-01 blob read url signing key";

/// Why a signed URL was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The URL's expiry is in the past.
    #[error("signed url has expired")]
    Expired,
    /// The signature does not match the path and expiry.
    #[error("signature mismatch")]
    Mismatch,
    /// The object path is malformed.
    #[error("invalid object path")]
    InvalidPath,
}

/// Mints and verifies read URLs.
#[derive(Clone)]
pub struct UrlSigner {
    base_url: String,
    key: [u8; 32],
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    /// Create a signer from a raw 32-byte key.
    #[must_use]
    pub fn new(base_url: impl Into<String>, key: [u8; 32]) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key,
        }
    }

    /// Create a signer whose key is derived from a secret string.
    #[must_use]
    pub fn from_secret(base_url: impl Into<String>, secret: &str) -> Self {
        Self::new(base_url, blake3::derive_key(KEY_CONTEXT, secret.as_bytes()))
    }

    /// Base URL that object paths are appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn signature(&self, path: &str, expires: i64) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(path.as_bytes());
        hasher.update(b"\n");
        hasher.update(expires.to_string().as_bytes());
        hasher.finalize()
    }

    /// Build a read URL for `path` valid until `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `path` is not a valid object path.
    pub fn sign(&self, path: &str, expires_at: DateTime<Utc>) -> Result<String> {
        super::validate_object_path(path).map_err(|e| Error::invalid(e.to_string()))?;
        let expires = expires_at.timestamp();
        let sig = self.signature(path, expires).to_hex();
        Ok(format!(
            "{}/{path}?expires={expires}&sig={sig}",
            self.base_url
        ))
    }

    /// Check a signature presented with a read request.
    ///
    /// # Errors
    ///
    /// Returns the reason the request must be refused.
    pub fn verify(
        &self,
        path: &str,
        expires: i64,
        sig: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), SignatureError> {
        super::validate_object_path(path)?;
        if expires <= now.timestamp() {
            return Err(SignatureError::Expired);
        }
        let presented = blake3::Hash::from_hex(sig).map_err(|_| SignatureError::Mismatch)?;
        // `blake3::Hash` equality is constant-time.
        if presented != self.signature(path, expires) {
            return Err(SignatureError::Mismatch);
        }
        Ok(())
    }
}
