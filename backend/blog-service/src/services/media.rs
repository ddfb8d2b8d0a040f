/// Media service - image upload to the object store
use crate::access;
use crate::db::{media_repo, post_repo};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::storage::ObjectStore;
use crate::AppState;
use serde::Serialize;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

pub const ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

/// A fully buffered upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedMedia {
    pub url: String,
    pub media_id: i32,
}

/// Lowercased extension of `filename` including the dot, if it is allowed
pub fn allowed_extension(filename: &str) -> Result<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::BadRequest(format!(
            "file type not allowed: {}",
            if ext.is_empty() { "(none)" } else { ext.as_str() }
        )))
    }
}

pub struct MediaService {
    pool: PgPool,
    objects: Arc<dyn ObjectStore>,
    max_upload_bytes: usize,
}

impl MediaService {
    pub fn new(pool: PgPool, objects: Arc<dyn ObjectStore>, max_upload_bytes: usize) -> Self {
        Self {
            pool,
            objects,
            max_upload_bytes,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.db.clone(),
            state.objects.clone(),
            state.media.max_upload_bytes,
        )
    }

    /// Store an image and record it, optionally attached to a post the
    /// requester owns.
    ///
    /// The extension is checked before anything touches the store or the
    /// object storage.
    pub async fn upload(
        &self,
        requester: &str,
        file: UploadedFile,
        post_id: Option<i32>,
    ) -> Result<UploadedMedia> {
        let ext = allowed_extension(&file.filename)?;

        if file.data.len() > self.max_upload_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "upload exceeds {} bytes",
                self.max_upload_bytes
            )));
        }

        if let Some(post_id) = post_id {
            let mut conn = self.pool.acquire().await?;
            let owned = access::ownership_predicate(requester);
            if post_repo::find_post(&mut *conn, post_id, &owned).await?.is_none() {
                return Err(AppError::NotFound(format!("post {}", post_id)));
            }
        }

        let object_name = format!("{}{}", Uuid::new_v4(), ext);
        let size = file.data.len();

        self.objects
            .put_object(&object_name, file.data, &file.content_type)
            .await
            .map_err(|e| {
                tracing::error!(object = %object_name, error = %e, "Object upload failed");
                AppError::from(e)
            })?;

        let mut tx = self.pool.begin().await?;
        let media = media_repo::create_media(&mut *tx, post_id, &object_name).await?;
        tx.commit().await?;

        metrics::record_upload(size);
        tracing::info!(media_id = media.id, object = %object_name, size, "Media uploaded");

        Ok(UploadedMedia {
            url: self.objects.public_url(&object_name),
            media_id: media.id,
        })
    }
}
