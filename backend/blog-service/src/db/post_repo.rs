use crate::access::Predicate;
use crate::models::{Post, PostInput, PostPatch, PostSummary};
use sqlx::{PgConnection, Postgres, QueryBuilder};

const POST_COLUMNS: &str = "posts.id, posts.author_id, posts.title, posts.short_description, \
     posts.content, posts.published, posts.created_at, posts.updated_at, \
     posts.published_at, posts.keywords";

const SUMMARY_COLUMNS: &str = "posts.id, posts.title, posts.created_at, posts.updated_at";

/// Insert a new post owned by `author_id`.
/// `published_at` is stamped when the post is created already published.
pub async fn create_post(
    conn: &mut PgConnection,
    author_id: &str,
    input: &PostInput,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(&format!(
        r#"
        INSERT INTO posts (author_id, title, short_description, content, published, keywords, published_at)
        VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $5 THEN NOW() ELSE NULL END)
        RETURNING {}
        "#,
        POST_COLUMNS
    ))
    .bind(author_id)
    .bind(&input.title)
    .bind(&input.short_description)
    .bind(&input.content)
    .bind(input.is_published())
    .bind(&input.keywords)
    .fetch_one(conn)
    .await?;

    Ok(post)
}

/// List post summaries matching `filter`, in insertion order
pub async fn list_posts(
    conn: &mut PgConnection,
    filter: &Predicate,
) -> Result<Vec<PostSummary>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {} FROM posts WHERE ",
        SUMMARY_COLUMNS
    ));
    filter.push_sql(&mut qb);
    qb.push(" ORDER BY posts.id ASC");

    qb.build_query_as::<PostSummary>().fetch_all(conn).await
}

/// Find a post by ID that also satisfies `filter`
pub async fn find_post(
    conn: &mut PgConnection,
    post_id: i32,
    filter: &Predicate,
) -> Result<Option<Post>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {} FROM posts WHERE posts.id = ",
        POST_COLUMNS
    ));
    qb.push_bind(post_id);
    qb.push(" AND ");
    filter.push_sql(&mut qb);

    qb.build_query_as::<Post>().fetch_optional(conn).await
}

/// Check whether a post exists regardless of visibility
pub async fn post_exists(conn: &mut PgConnection, post_id: i32) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
        .bind(post_id)
        .fetch_one(conn)
        .await?;

    Ok(exists)
}

/// Overwrite every mutable field of a post satisfying `filter`.
/// Returns `None` when no such post exists.
pub async fn replace_post(
    conn: &mut PgConnection,
    post_id: i32,
    filter: &Predicate,
    input: &PostInput,
) -> Result<Option<Post>, sqlx::Error> {
    let published = input.is_published();

    let mut qb = QueryBuilder::<Postgres>::new("UPDATE posts SET title = ");
    qb.push_bind(input.title.clone());
    qb.push(", content = ");
    qb.push_bind(input.content.clone());
    qb.push(", short_description = ");
    qb.push_bind(input.short_description.clone());
    qb.push(", keywords = ");
    qb.push_bind(input.keywords.clone());
    qb.push(", published = ");
    qb.push_bind(published);
    qb.push(", published_at = CASE WHEN ");
    qb.push_bind(published);
    qb.push(" THEN COALESCE(posts.published_at, NOW()) ELSE NULL END");
    qb.push(", updated_at = NOW() WHERE posts.id = ");
    qb.push_bind(post_id);
    qb.push(" AND ");
    filter.push_sql(&mut qb);
    qb.push(" RETURNING ");
    qb.push(POST_COLUMNS);

    qb.build_query_as::<Post>().fetch_optional(conn).await
}

/// Overwrite only the fields present in `patch` on a post satisfying `filter`.
/// Returns `None` when no such post exists.
pub async fn patch_post(
    conn: &mut PgConnection,
    post_id: i32,
    filter: &Predicate,
    patch: &PostPatch,
) -> Result<Option<Post>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE posts SET title = COALESCE(");
    qb.push_bind(patch.title.clone());
    qb.push(", posts.title), content = COALESCE(");
    qb.push_bind(patch.content.clone());
    qb.push(", posts.content), short_description = COALESCE(");
    qb.push_bind(patch.short_description.clone());
    qb.push(", posts.short_description), keywords = COALESCE(");
    qb.push_bind(patch.keywords.clone());
    qb.push(", posts.keywords), published = COALESCE(");
    qb.push_bind(patch.published);
    qb.push(", posts.published), published_at = CASE WHEN COALESCE(");
    qb.push_bind(patch.published);
    qb.push(", posts.published) THEN COALESCE(posts.published_at, NOW()) ELSE NULL END");
    qb.push(", updated_at = NOW() WHERE posts.id = ");
    qb.push_bind(post_id);
    qb.push(" AND ");
    filter.push_sql(&mut qb);
    qb.push(" RETURNING ");
    qb.push(POST_COLUMNS);

    qb.build_query_as::<Post>().fetch_optional(conn).await
}

/// Delete a post satisfying `filter`. Comments, media and favorites
/// cascade. Returns whether a row was removed.
pub async fn delete_post(
    conn: &mut PgConnection,
    post_id: i32,
    filter: &Predicate,
) -> Result<bool, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM posts WHERE posts.id = ");
    qb.push_bind(post_id);
    qb.push(" AND ");
    filter.push_sql(&mut qb);

    let result = qb.build().execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Store extracted keywords. Returns false if the post no longer exists.
pub async fn set_keywords(
    conn: &mut PgConnection,
    post_id: i32,
    keywords: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE posts SET keywords = $1 WHERE id = $2")
        .bind(keywords)
        .bind(post_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}
