use crate::access::Predicate;
use crate::models::{FavoritePost, PostSummary};
use sqlx::{PgConnection, Postgres, QueryBuilder};

/// Add a post to a user's favorites.
/// Returns `None` if the pair already exists; nothing is written in that case.
pub async fn create_favorite(
    conn: &mut PgConnection,
    user_id: &str,
    post_id: i32,
) -> Result<Option<FavoritePost>, sqlx::Error> {
    let favorite = sqlx::query_as::<_, FavoritePost>(
        r#"
        INSERT INTO favorite_posts (user_id, post_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, post_id) DO NOTHING
        RETURNING id, user_id, post_id, created_at
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .fetch_optional(conn)
    .await?;

    Ok(favorite)
}

/// Delete a favorite. Returns whether a row was removed.
pub async fn delete_favorite(
    conn: &mut PgConnection,
    user_id: &str,
    post_id: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM favorite_posts
        WHERE user_id = $1 AND post_id = $2
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Posts a user has favorited that still satisfy `filter`
pub async fn list_favorite_posts(
    conn: &mut PgConnection,
    user_id: &str,
    filter: &Predicate,
) -> Result<Vec<PostSummary>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT posts.id, posts.title, posts.created_at, posts.updated_at \
         FROM posts JOIN favorite_posts ON favorite_posts.post_id = posts.id \
         WHERE favorite_posts.user_id = ",
    );
    qb.push_bind(user_id.to_string());
    qb.push(" AND ");
    filter.push_sql(&mut qb);
    qb.push(" ORDER BY posts.id ASC");

    qb.build_query_as::<PostSummary>().fetch_all(conn).await
}
