use crate::models::Media;
use sqlx::PgConnection;

/// Record an uploaded object
pub async fn create_media(
    conn: &mut PgConnection,
    post_id: Option<i32>,
    file_path: &str,
) -> Result<Media, sqlx::Error> {
    let media = sqlx::query_as::<_, Media>(
        r#"
        INSERT INTO media (post_id, file_path)
        VALUES ($1, $2)
        RETURNING id, post_id, file_path, created_at
        "#,
    )
    .bind(post_id)
    .bind(file_path)
    .fetch_one(conn)
    .await?;

    Ok(media)
}
