//! src/services/media_service.rs
//!
//! The media pipeline: uploads go to an external asset store behind the
//! [`AssetStore`] contract, then a metadata record is written to SQLite.
//! The two writes are deliberately not atomic — when the metadata write
//! fails after a successful store write the upload is kept and the caller
//! gets a degraded success, never a rollback.

use crate::models::media::{MediaRecord, ResourceType};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use sqlx::types::Json;
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
    sync::Arc,
};
use thiserror::Error;
use tokio::{fs, fs::File, io::AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

const MAX_PUBLIC_ID_LEN: usize = 512;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid asset key")]
    InvalidKey,
    #[error("asset `{0}` not found")]
    AssetNotFound(String),
    #[error("media record `{0}` not found")]
    MetadataNotFound(Uuid),
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error(transparent)]
    Persistence(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type MediaResult<T> = Result<T, MediaError>;

/// What the asset store reports after a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct StoredAsset {
    pub public_id: String,
    pub secure_url: String,
    pub resource_type: ResourceType,
    pub bytes: i64,
    pub format: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Acknowledgement from `destroy`: `"ok"` when removed, `"not found"`
/// when the key had no asset behind it.
#[derive(Debug, Clone, Serialize)]
pub struct DestroyOutcome {
    pub result: &'static str,
}

/// Call contract of the external asset store. The pipeline depends on
/// this seam only; the disk-backed implementation below is what ships.
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    async fn upload(
        &self,
        data: Bytes,
        folder: &str,
        resource_type: ResourceType,
    ) -> MediaResult<StoredAsset>;

    async fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> MediaResult<DestroyOutcome>;
}

/// Sniff an image format from magic bytes. Anything unrecognized is
/// stored as-is under a generic format.
fn sniff_format(bytes: &[u8], resource_type: ResourceType) -> &'static str {
    if resource_type == ResourceType::Image {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => return "jpg",
            [0x89, 0x50, 0x4E, 0x47, ..] => return "png",
            [0x47, 0x49, 0x46, 0x38, ..] => return "gif",
            [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => return "webp",
            _ => {}
        }
    }
    "bin"
}

/// Disk-backed asset store. Payloads live under
/// `base_path/{namespace}/{folder}/{uuid}` and are served back through
/// the `/assets/{*public_id}` route, which is where `secure_url` points.
#[derive(Clone)]
pub struct DiskAssetStore {
    pub base_path: PathBuf,
    public_base_url: String,
    namespace: String,
}

impl DiskAssetStore {
    pub fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            namespace: namespace.into(),
        }
    }

    /// Basic key validation to avoid trivial path traversal vectors.
    /// Rejects keys that begin with `/` or contain `..`.
    fn ensure_key_safe(key: &str) -> MediaResult<()> {
        if key.is_empty() || key.len() > MAX_PUBLIC_ID_LEN {
            return Err(MediaError::InvalidKey);
        }
        if key.starts_with('/') || key.contains("..") {
            return Err(MediaError::InvalidKey);
        }
        if key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(MediaError::InvalidKey);
        }
        Ok(())
    }

    /// Folder names are a single path segment, lowercase alphanumerics
    /// plus hyphen/underscore.
    fn ensure_folder_safe(folder: &str) -> MediaResult<()> {
        if folder.is_empty()
            || !folder
                .chars()
                .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-' | '_'))
        {
            return Err(MediaError::InvalidKey);
        }
        Ok(())
    }

    /// Open a stored asset for streaming out. Used by the asset-serving
    /// route; not part of the [`AssetStore`] contract because a hosted
    /// store serves its own URLs.
    pub async fn open(&self, public_id: &str) -> MediaResult<File> {
        Self::ensure_key_safe(public_id)?;
        let path = self.base_path.join(public_id);
        File::open(&path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                MediaError::AssetNotFound(public_id.to_string())
            } else {
                MediaError::Io(err)
            }
        })
    }
}

#[async_trait::async_trait]
impl AssetStore for DiskAssetStore {
    /// Write the payload to a temporary file, fsync, then atomically
    /// rename into place. On any failure the temp file is removed and the
    /// error surfaces as `UploadFailed`.
    async fn upload(
        &self,
        data: Bytes,
        folder: &str,
        resource_type: ResourceType,
    ) -> MediaResult<StoredAsset> {
        Self::ensure_folder_safe(folder)?;

        let key = format!("{}/{}/{}", self.namespace, folder, Uuid::new_v4());
        Self::ensure_key_safe(&key)?;

        let file_path = self.base_path.join(&key);
        let parent = file_path
            .parent()
            .ok_or_else(|| MediaError::UploadFailed("asset path missing parent".into()))?
            .to_path_buf();
        fs::create_dir_all(&parent)
            .await
            .map_err(|err| MediaError::UploadFailed(err.to_string()))?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let write = async {
            let mut file = File::create(&tmp_path).await?;
            file.write_all(&data).await?;
            file.flush().await?;
            file.sync_all().await?;
            fs::rename(&tmp_path, &file_path).await?;
            Ok::<_, io::Error>(())
        };
        if let Err(err) = write.await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(MediaError::UploadFailed(err.to_string()));
        }

        Ok(StoredAsset {
            secure_url: format!("{}/assets/{}", self.public_base_url, key),
            public_id: key,
            resource_type,
            bytes: data.len() as i64,
            format: sniff_format(&data, resource_type).to_string(),
            width: None,
            height: None,
        })
    }

    /// Remove the payload by key. Missing assets acknowledge as
    /// `"not found"` rather than erroring.
    async fn destroy(
        &self,
        public_id: &str,
        _resource_type: ResourceType,
    ) -> MediaResult<DestroyOutcome> {
        Self::ensure_key_safe(public_id)?;
        let path = self.base_path.join(public_id);
        match fs::remove_file(&path).await {
            Ok(_) => {
                debug!("removed asset {}", path.display());
                Ok(DestroyOutcome { result: "ok" })
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Ok(DestroyOutcome { result: "not found" })
            }
            Err(err) => Err(MediaError::Io(err)),
        }
    }
}

/// Result of an upload through the pipeline. `media_id` is absent on the
/// degraded path where the asset was stored but its metadata was not.
#[derive(Debug)]
pub struct UploadOutcome {
    pub asset: StoredAsset,
    pub media_id: Option<Uuid>,
    pub metadata_error: Option<String>,
}

/// Couples the asset store with the metadata collection.
#[derive(Clone)]
pub struct MediaService {
    /// Shared SQLite connection pool holding the `media` collection.
    pub db: Arc<SqlitePool>,

    store: Arc<dyn AssetStore>,
}

impl MediaService {
    pub fn new(db: Arc<SqlitePool>, store: Arc<dyn AssetStore>) -> Self {
        Self { db, store }
    }

    /// Two-phase upload: store the asset, then record its metadata. The
    /// caller must capture `media_id` (or `public_id`) before creating
    /// the content record that references it.
    pub async fn upload(
        &self,
        data: Bytes,
        folder: &str,
        resource_type: ResourceType,
    ) -> MediaResult<UploadOutcome> {
        let asset = self.store.upload(data, folder, resource_type).await?;

        let id = Uuid::new_v4();
        let raw = serde_json::to_value(&asset).unwrap_or(serde_json::Value::Null);
        let insert = sqlx::query(
            "INSERT INTO media (id, public_id, secure_url, resource_type, folder, bytes, \
             format, width, height, created_at, raw_response)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&asset.public_id)
        .bind(&asset.secure_url)
        .bind(asset.resource_type)
        .bind(folder)
        .bind(asset.bytes)
        .bind(&asset.format)
        .bind(asset.width)
        .bind(asset.height)
        .bind(Utc::now())
        .bind(Json(raw))
        .execute(&*self.db)
        .await;

        match insert {
            Ok(_) => Ok(UploadOutcome {
                asset,
                media_id: Some(id),
                metadata_error: None,
            }),
            Err(err) => {
                // Degraded success: the asset stays in the store, the
                // caller is told metadata persistence failed.
                warn!(
                    "metadata write failed after upload of `{}`: {}",
                    asset.public_id, err
                );
                Ok(UploadOutcome {
                    asset,
                    media_id: None,
                    metadata_error: Some("failed to save metadata".into()),
                })
            }
        }
    }

    /// Remove the asset from the store only. The metadata record is the
    /// caller's responsibility.
    pub async fn delete(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> MediaResult<DestroyOutcome> {
        self.store.destroy(public_id, resource_type).await
    }

    pub async fn get(&self, id: Uuid) -> MediaResult<MediaRecord> {
        sqlx::query_as::<_, MediaRecord>(
            "SELECT id, public_id, secure_url, resource_type, folder, bytes, format, \
             width, height, created_at, raw_response FROM media WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(MediaError::MetadataNotFound(id))
    }

    pub async fn find_by_public_id(&self, public_id: &str) -> MediaResult<Option<MediaRecord>> {
        let record = sqlx::query_as::<_, MediaRecord>(
            "SELECT id, public_id, secure_url, resource_type, folder, bytes, format, \
             width, height, created_at, raw_response FROM media WHERE public_id = ? LIMIT 1",
        )
        .bind(public_id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(record)
    }

    /// Best-effort sweep invoked after a content record holding a
    /// `media_id` is deleted: destroy the asset, then drop its metadata
    /// row. Failures are logged by the caller, never surfaced.
    pub async fn cleanup(&self, media_id: Uuid) -> MediaResult<()> {
        let record = self.get(media_id).await?;
        self.store
            .destroy(&record.public_id, record.resource_type)
            .await?;
        sqlx::query("DELETE FROM media WHERE id = ?")
            .bind(media_id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;
    use tempfile::TempDir;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];

    fn disk_store(dir: &TempDir) -> Arc<DiskAssetStore> {
        Arc::new(DiskAssetStore::new(
            dir.path(),
            "http://localhost:3000",
            "site",
        ))
    }

    async fn media_service() -> (MediaService, Arc<DiskAssetStore>, TempDir, TempDir) {
        let (db, db_dir) = test_pool().await;
        let asset_dir = TempDir::new().unwrap();
        let store = disk_store(&asset_dir);
        (
            MediaService::new(db, store.clone()),
            store,
            asset_dir,
            db_dir,
        )
    }

    #[tokio::test]
    async fn upload_stores_asset_and_metadata() {
        let (media, store, _assets, _db) = media_service().await;

        let outcome = media
            .upload(Bytes::from_static(PNG_MAGIC), "blog", ResourceType::Image)
            .await
            .unwrap();

        assert!(outcome.asset.public_id.starts_with("site/blog/"));
        assert_eq!(outcome.asset.format, "png");
        assert_eq!(outcome.asset.bytes, PNG_MAGIC.len() as i64);
        assert!(
            outcome
                .asset
                .secure_url
                .starts_with("http://localhost:3000/assets/site/blog/")
        );
        assert!(outcome.metadata_error.is_none());

        let record = media.get(outcome.media_id.unwrap()).await.unwrap();
        assert_eq!(record.public_id, outcome.asset.public_id);
        assert_eq!(record.resource_type, ResourceType::Image);

        // Payload is readable back through the store.
        let mut file = store.open(&record.public_id).await.unwrap();
        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut file, &mut buf)
            .await
            .unwrap();
        assert_eq!(buf, PNG_MAGIC);
    }

    #[tokio::test]
    async fn metadata_failure_is_degraded_success() {
        let (media, _store, _assets, _db) = media_service().await;
        sqlx::query("DROP TABLE media")
            .execute(&*media.db)
            .await
            .unwrap();

        let outcome = media
            .upload(Bytes::from_static(PNG_MAGIC), "blog", ResourceType::Image)
            .await
            .unwrap();

        assert!(outcome.media_id.is_none());
        assert!(outcome.metadata_error.is_some());
        // The asset itself was kept.
        assert!(outcome.asset.bytes > 0);
    }

    #[tokio::test]
    async fn destroy_acks_missing_assets() {
        let (media, _store, _assets, _db) = media_service().await;

        let outcome = media
            .upload(Bytes::from_static(PNG_MAGIC), "general", ResourceType::Image)
            .await
            .unwrap();

        let ack = media
            .delete(&outcome.asset.public_id, ResourceType::Image)
            .await
            .unwrap();
        assert_eq!(ack.result, "ok");

        // Second destroy: the asset is gone, the ack says so.
        let ack = media
            .delete(&outcome.asset.public_id, ResourceType::Image)
            .await
            .unwrap();
        assert_eq!(ack.result, "not found");

        // Metadata record intentionally survives a store-only delete.
        assert!(media.get(outcome.media_id.unwrap()).await.is_ok());
    }

    #[tokio::test]
    async fn cleanup_removes_asset_and_metadata() {
        let (media, store, _assets, _db) = media_service().await;

        let outcome = media
            .upload(Bytes::from_static(PNG_MAGIC), "projects", ResourceType::Image)
            .await
            .unwrap();
        let media_id = outcome.media_id.unwrap();

        media.cleanup(media_id).await.unwrap();

        assert!(matches!(
            media.get(media_id).await.unwrap_err(),
            MediaError::MetadataNotFound(_)
        ));
        assert!(matches!(
            store.open(&outcome.asset.public_id).await.unwrap_err(),
            MediaError::AssetNotFound(_)
        ));
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let (media, store, _assets, _db) = media_service().await;

        assert!(matches!(
            store.open("../etc/passwd").await.unwrap_err(),
            MediaError::InvalidKey
        ));
        assert!(matches!(
            media.delete("/absolute", ResourceType::Image).await.unwrap_err(),
            MediaError::InvalidKey
        ));
        assert!(matches!(
            media
                .upload(Bytes::from_static(b"x"), "../sneaky", ResourceType::Raw)
                .await
                .unwrap_err(),
            MediaError::InvalidKey
        ));
    }

    #[tokio::test]
    async fn unrecognized_payloads_fall_back_to_bin() {
        let (media, _store, _assets, _db) = media_service().await;

        let outcome = media
            .upload(Bytes::from_static(b"plain text"), "documents", ResourceType::Raw)
            .await
            .unwrap();
        assert_eq!(outcome.asset.format, "bin");
        assert_eq!(outcome.asset.resource_type, ResourceType::Raw);
    }
}
