/// Media upload handler
///
/// POST /api/blog/upload, multipart with a `file` part and an optional
/// `post_id` part. The file is buffered in memory up to the configured limit.
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::services::media::allowed_extension;
use crate::services::{MediaService, UploadedFile};
use crate::AppState;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::stream::StreamExt;

pub async fn upload_media(
    state: web::Data<AppState>,
    user_id: UserId,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let max_bytes = state.media.max_upload_bytes;
    let mut file: Option<UploadedFile> = None;
    let mut post_id: Option<i32> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        match name.as_str() {
            "file" => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_string)
                    .ok_or_else(|| AppError::BadRequest("file part has no filename".into()))?;
                // Reject before buffering the body
                allowed_extension(&filename)?;
                let content_type = field
                    .content_type()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = read_field(&mut field, max_bytes).await?;

                file = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            "post_id" => {
                let raw = read_field(&mut field, 64).await?;
                let text = String::from_utf8_lossy(&raw);
                let text = text.trim();
                if !text.is_empty() {
                    post_id = Some(text.parse().map_err(|_| {
                        AppError::BadRequest(format!("invalid post_id: {}", text))
                    })?);
                }
            }
            _ => {
                read_field(&mut field, max_bytes).await?;
            }
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("missing file part".into()))?;

    let uploaded = MediaService::from_state(&state)
        .upload(&user_id.0, file, post_id)
        .await?;

    Ok(HttpResponse::Created().json(uploaded))
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if data.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge(format!(
                "upload exceeds {} bytes",
                limit
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}
