use crate::models::Comment;
use sqlx::PgConnection;

/// Create a new comment on a post
pub async fn create_comment(
    conn: &mut PgConnection,
    post_id: i32,
    author_id: &str,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (post_id, author_id, content)
        VALUES ($1, $2, $3)
        RETURNING id, post_id, author_id, content, created_at, updated_at
        "#,
    )
    .bind(post_id)
    .bind(author_id)
    .bind(content)
    .fetch_one(conn)
    .await?;

    Ok(comment)
}

/// Get all comments for a post, oldest first
pub async fn get_comments_by_post(
    conn: &mut PgConnection,
    post_id: i32,
) -> Result<Vec<Comment>, sqlx::Error> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, post_id, author_id, content, created_at, updated_at
        FROM comments
        WHERE post_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(conn)
    .await?;

    Ok(comments)
}

/// Update comment content if `author_id` wrote it
pub async fn update_comment(
    conn: &mut PgConnection,
    comment_id: i32,
    author_id: &str,
    content: &str,
) -> Result<Option<Comment>, sqlx::Error> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET content = $3, updated_at = NOW()
        WHERE id = $1 AND author_id = $2
        RETURNING id, post_id, author_id, content, created_at, updated_at
        "#,
    )
    .bind(comment_id)
    .bind(author_id)
    .bind(content)
    .fetch_optional(conn)
    .await?;

    Ok(comment)
}

/// Delete a comment if `author_id` wrote it. Returns whether a row was removed.
pub async fn delete_comment(
    conn: &mut PgConnection,
    comment_id: i32,
    author_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND author_id = $2")
        .bind(comment_id)
        .bind(author_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}
