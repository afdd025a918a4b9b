use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{MediaObject, MediaStore, StorageError, StoredMedia};

const META_SUFFIX: &str = ".meta.json";
const MAX_FILENAME_LEN: usize = 100;
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Serialize, Deserialize)]
struct ObjectMeta {
    content_type: String,
    size: u64,
}

/// Stores each object as a flat file at `{dir}/{name}` with its metadata in
/// a `{name}.meta.json` sidecar. URLs point at the server's `/media` route.
pub struct LocalMediaStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalMediaStore {
    pub async fn new(dir: PathBuf, public_base_url: &str) -> Result<Self, StorageError> {
        fs::create_dir_all(&dir).await?;
        info!("Media storage directory: {}", dir.display());
        Ok(Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn object_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn meta_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{META_SUFFIX}"))
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/media/{}", self.public_base_url, name)
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(
        &self,
        bytes: Bytes,
        content_type: &str,
        suggested_name: &str,
    ) -> Result<StoredMedia, StorageError> {
        let name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(suggested_name));

        fs::write(self.object_path(&name), &bytes).await?;

        let meta = ObjectMeta {
            content_type: content_type.to_string(),
            size: bytes.len() as u64,
        };
        if let Err(e) = fs::write(self.meta_path(&name), serde_json::to_vec(&meta)?).await {
            // Don't leave a blob behind that can't be served correctly
            let _ = fs::remove_file(self.object_path(&name)).await;
            return Err(e.into());
        }

        info!("Stored media {} ({} bytes, {})", name, meta.size, meta.content_type);
        Ok(StoredMedia {
            url: self.url_for(&name),
            name,
        })
    }

    async fn fetch(&self, name: &str) -> Result<Option<MediaObject>, StorageError> {
        validate_name(name)?;

        let bytes = match fs::read(self.object_path(name)).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let content_type = match fs::read(self.meta_path(name)).await {
            Ok(raw) => serde_json::from_slice::<ObjectMeta>(&raw)?.content_type,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Media {} has no metadata sidecar", name);
                FALLBACK_CONTENT_TYPE.to_string()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Some(MediaObject {
            bytes,
            content_type,
        }))
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        validate_name(name)?;

        for path in [self.object_path(name), self.meta_path(name)] {
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        info!("Deleted media {}", name);
        Ok(())
    }
}

/// Reduce a client-supplied filename to a safe, URL-friendly last path
/// component.
fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LEN)
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Names handed back to `fetch`/`delete` must be ones `upload` could have
/// produced.
fn validate_name(name: &str) -> Result<(), StorageError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && !name.ends_with(META_SUFFIX)
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, LocalMediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path().join("media"), "http://cdn.test/")
            .await
            .unwrap();
        (dir, store)
    }

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("cat.png"), "cat.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\pics\\my cat!.jpg"), "my_cat_.jpg");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn rejects_names_outside_the_store() {
        assert!(validate_name("../secret").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("x.png.meta.json").is_err());
        assert!(validate_name("0b7c-cat.png").is_ok());
    }

    #[tokio::test]
    async fn upload_then_fetch_keeps_content_type() {
        let (_dir, store) = store().await;
        let stored = store
            .upload(Bytes::from_static(b"\x89PNG fake"), "image/png", "cat.png")
            .await
            .unwrap();

        assert!(stored.name.ends_with("-cat.png"));
        assert_eq!(stored.url, format!("http://cdn.test/media/{}", stored.name));

        let object = store.fetch(&stored.name).await.unwrap().unwrap();
        assert_eq!(object.content_type, "image/png");
        assert_eq!(&object.bytes[..], b"\x89PNG fake");
    }

    #[tokio::test]
    async fn same_filename_gets_distinct_names() {
        let (_dir, store) = store().await;
        let a = store.upload(Bytes::from_static(b"a"), "image/jpeg", "x.jpg").await.unwrap();
        let b = store.upload(Bytes::from_static(b"b"), "image/jpeg", "x.jpg").await.unwrap();
        assert_ne!(a.name, b.name);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = store().await;
        let stored = store.upload(Bytes::from_static(b"a"), "image/gif", "a.gif").await.unwrap();

        store.delete(&stored.name).await.unwrap();
        store.delete(&stored.name).await.unwrap();
        assert!(store.fetch(&stored.name).await.unwrap().is_none());
    }
}
