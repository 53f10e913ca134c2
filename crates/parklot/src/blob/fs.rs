//! Filesystem-backed [`BlobStore`].
//!
//! Objects live under a root directory at their object path. Each object
//! gets a `<name>.meta.json` sidecar recording its content type.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use super::{validate_object_path, BlobMeta, BlobStore, StoredBlob, UrlSigner};
use crate::error::{Error, Result};

/// File holding the generated signing secret when none is configured.
const SIGNING_KEY_FILE: &str = ".signing-key";

/// Suffix of the metadata sidecar file.
const META_SUFFIX: &str = ".meta.json";

/// Blob storage in a local directory.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    signer: UrlSigner,
}

impl FsBlobStore {
    /// Open (and create if needed) a blob directory.
    ///
    /// When `secret` is `None`, a random secret is generated on first use
    /// and kept in the root directory so previously issued URLs keep working
    /// after a restart.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the secret file cannot be created.
    pub fn open(root: impl AsRef<Path>, base_url: &str, secret: Option<&str>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|source| Error::DirectoryCreate {
            path: root.clone(),
            source,
        })?;

        let signer = match secret {
            Some(secret) => UrlSigner::from_secret(base_url, secret),
            None => UrlSigner::from_secret(base_url, &load_or_create_secret(&root)?),
        };

        info!("Blob store opened at {}", root.display());
        Ok(Self { root, signer })
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_file(&self, path: &str) -> Result<PathBuf> {
        validate_object_path(path).map_err(|e| Error::invalid(format!("{e}: {path}")))?;
        Ok(self.root.join(path))
    }
}

fn meta_file(object: &Path) -> PathBuf {
    let mut name = object.as_os_str().to_os_string();
    name.push(META_SUFFIX);
    PathBuf::from(name)
}

fn load_or_create_secret(root: &Path) -> Result<String> {
    let key_path = root.join(SIGNING_KEY_FILE);
    match std::fs::read_to_string(&key_path) {
        Ok(secret) if !secret.trim().is_empty() => return Ok(secret.trim().to_string()),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let secret = format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    );
    std::fs::write(&key_path, &secret)?;
    debug!("Generated blob signing secret at {}", key_path.display());
    Ok(secret)
}

#[async_trait::async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        let file = self.object_file(path)?;
        let write_err = |source| Error::BlobWrite {
            path: path.to_string(),
            source,
        };

        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        tokio::fs::write(&file, bytes).await.map_err(write_err)?;

        let meta = BlobMeta {
            content_type: content_type.to_string(),
            size: bytes.len() as u64,
            stored_at: Utc::now(),
        };
        tokio::fs::write(meta_file(&file), serde_json::to_vec(&meta)?)
            .await
            .map_err(write_err)?;

        debug!(path, size = bytes.len(), "Stored blob");
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<StoredBlob>> {
        let file = self.object_file(path)?;
        let read_err = |source| Error::BlobRead {
            path: path.to_string(),
            source,
        };

        let bytes = match tokio::fs::read(&file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(read_err(e)),
        };
        let meta: BlobMeta =
            serde_json::from_slice(&tokio::fs::read(meta_file(&file)).await.map_err(read_err)?)?;

        Ok(Some(StoredBlob {
            bytes,
            content_type: meta.content_type,
        }))
    }

    fn signer(&self) -> &UrlSigner {
        &self.signer
    }
}
