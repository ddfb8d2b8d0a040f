//! Integration Tests: post access control and write side effects
//!
//! Coverage:
//! - Draft visibility and ownership for read, update, delete
//! - Listing filters never widen visibility
//! - PUT overwrite vs PATCH partial update, publication timestamps
//! - Comments, favorites and media cascade with the post
//! - Search mirroring and keyword dispatch after commit
//! - Keyword worker job processing
//!
//! Architecture:
//! - Uses testcontainers for PostgreSQL database
//! - Mocks the search index, object store and keyword queue
//!
//! Run with: cargo test --test blog_e2e_test -- --ignored

mod common;

use blog_service::access::ListFilter;
use blog_service::db::{comment_repo, favorite_repo};
use blog_service::jobs::keywords::{process_job, JobOutcome, KeywordJob};
use blog_service::models::{PostInput, PostPatch};
use blog_service::search::SearchError;
use blog_service::services::{
    CommentService, FavoriteOutcome, FavoriteService, MediaService, PostService, UploadedFile,
};
use blog_service::AppError;
use common::*;
use mockall::predicate::always;
use sqlx::PgPool;
use std::sync::Arc;

const ALICE: &str = "alice";
const BOB: &str = "bob";

fn post_service(pool: &PgPool) -> PostService {
    PostService::new(
        pool.clone(),
        Arc::new(permissive_index()),
        Arc::new(permissive_queue()),
    )
}

fn input(title: &str, content: &str, published: bool) -> PostInput {
    PostInput {
        title: title.to_string(),
        content: content.to_string(),
        short_description: Some(format!("about {}", title)),
        published: Some(published),
        keywords: None,
    }
}

async fn setup() -> PgPool {
    setup_test_db().await.expect("Failed to start PostgreSQL")
}

// ============================================
// Visibility and ownership
// ============================================

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_draft_is_invisible_to_other_users() {
    let pool = setup().await;
    let posts = post_service(&pool);

    let draft = posts
        .create_post(ALICE, &input("Draft", "work in progress", false))
        .await
        .unwrap();

    assert_eq!(posts.get_post(ALICE, draft.id).await.unwrap().id, draft.id);
    assert!(matches!(
        posts.get_post(BOB, draft.id).await,
        Err(AppError::NotFound(_))
    ));

    let bob_list = posts.list_posts(BOB, &ListFilter::default()).await.unwrap();
    assert!(bob_list.iter().all(|p| p.id != draft.id));

    let alice_list = posts.list_posts(ALICE, &ListFilter::default()).await.unwrap();
    assert!(alice_list.iter().any(|p| p.id == draft.id));
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_only_owner_can_modify_published_post() {
    let pool = setup().await;
    let posts = post_service(&pool);

    let post = posts
        .create_post(ALICE, &input("Public", "hello world", true))
        .await
        .unwrap();

    assert_eq!(posts.get_post(BOB, post.id).await.unwrap().title, "Public");

    assert!(matches!(
        posts.update_post(BOB, post.id, &input("Hijacked", "x", true)).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        posts
            .patch_post(
                BOB,
                post.id,
                &PostPatch {
                    title: Some("Hijacked".into()),
                    ..Default::default()
                }
            )
            .await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        posts.delete_post(BOB, post.id).await,
        Err(AppError::NotFound(_))
    ));

    assert_eq!(posts.get_post(ALICE, post.id).await.unwrap().title, "Public");
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_list_filters_never_widen_visibility() {
    let pool = setup().await;
    let posts = post_service(&pool);

    let alice_draft = posts.create_post(ALICE, &input("A draft", "a", false)).await.unwrap();
    let alice_pub = posts.create_post(ALICE, &input("A pub", "a", true)).await.unwrap();
    let bob_draft = posts.create_post(BOB, &input("B draft", "b", false)).await.unwrap();
    let bob_pub = posts.create_post(BOB, &input("B pub", "b", true)).await.unwrap();

    // Unpublished filter from bob: only his own drafts
    let drafts = posts
        .list_posts(
            BOB,
            &ListFilter {
                published: Some(false),
                author_id: None,
            },
        )
        .await
        .unwrap();
    let ids: Vec<i32> = drafts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![bob_draft.id]);

    // Author filter on someone else: only their published posts
    let alice_posts = posts
        .list_posts(
            BOB,
            &ListFilter {
                published: None,
                author_id: Some(ALICE.to_string()),
            },
        )
        .await
        .unwrap();
    let ids: Vec<i32> = alice_posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![alice_pub.id]);

    // No filter: everything published plus own drafts, in id order
    let all = posts.list_posts(ALICE, &ListFilter::default()).await.unwrap();
    let ids: Vec<i32> = all.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![alice_draft.id, alice_pub.id, bob_pub.id]);
}

// ============================================
// Full vs partial update
// ============================================

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_put_overwrites_and_patch_keeps_omitted_fields() {
    let pool = setup().await;
    let posts = post_service(&pool);

    let post = posts
        .create_post(ALICE, &input("Original", "first body", true))
        .await
        .unwrap();
    let first_published_at = post.published_at.expect("published_at set on publish");
    assert!(post.updated_at.is_none());

    let patched = posts
        .patch_post(
            ALICE,
            post.id,
            &PostPatch {
                title: Some("Patched".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.title, "Patched");
    assert_eq!(patched.content, "first body");
    assert_eq!(patched.short_description, post.short_description);
    assert!(patched.published);
    assert_eq!(patched.published_at, Some(first_published_at));
    assert!(patched.updated_at.is_some());

    let replaced = posts
        .update_post(
            ALICE,
            post.id,
            &PostInput {
                title: "Replaced".into(),
                content: "second body".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(replaced.title, "Replaced");
    assert_eq!(replaced.short_description, None);
    assert!(!replaced.published);
    assert_eq!(replaced.published_at, None);

    // Now a draft: invisible to others
    assert!(matches!(
        posts.get_post(BOB, post.id).await,
        Err(AppError::NotFound(_))
    ));
}

// ============================================
// Comments and favorites
// ============================================

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_comment_lifecycle() {
    let pool = setup().await;
    let posts = post_service(&pool);
    let comments = CommentService::new(pool.clone());

    let post = posts.create_post(ALICE, &input("Post", "body", true)).await.unwrap();

    let comment = comments.create_comment(BOB, post.id, "nice").await.unwrap();
    assert_eq!(comment.author_id, BOB);

    let listed = comments.list_comments(ALICE, post.id).await.unwrap();
    assert_eq!(listed.len(), 1);

    assert!(matches!(
        comments.update_comment(ALICE, comment.id, "edited by alice").await,
        Err(AppError::NotFound(_))
    ));
    let edited = comments.update_comment(BOB, comment.id, "very nice").await.unwrap();
    assert_eq!(edited.content, "very nice");
    assert!(edited.updated_at.is_some());

    assert!(matches!(
        comments.delete_comment(ALICE, comment.id).await,
        Err(AppError::NotFound(_))
    ));
    comments.delete_comment(BOB, comment.id).await.unwrap();
    assert!(comments.list_comments(ALICE, post.id).await.unwrap().is_empty());

    assert!(matches!(
        comments.create_comment(BOB, 999_999, "orphan").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_comments_of_draft_are_hidden_from_others() {
    let pool = setup().await;
    let posts = post_service(&pool);
    let comments = CommentService::new(pool.clone());

    let draft = posts.create_post(ALICE, &input("Draft", "body", false)).await.unwrap();
    comments.create_comment(ALICE, draft.id, "note to self").await.unwrap();

    assert_eq!(comments.list_comments(ALICE, draft.id).await.unwrap().len(), 1);
    assert!(matches!(
        comments.list_comments(BOB, draft.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_favorite_twice_reports_existing() {
    let pool = setup().await;
    let posts = post_service(&pool);
    let favorites = FavoriteService::new(pool.clone());

    let post = posts.create_post(ALICE, &input("Fav", "body", true)).await.unwrap();

    assert_eq!(
        favorites.add_favorite(BOB, post.id).await.unwrap(),
        FavoriteOutcome::Added
    );
    assert_eq!(
        favorites.add_favorite(BOB, post.id).await.unwrap(),
        FavoriteOutcome::AlreadyExists
    );

    let listed = favorites.list_favorites(BOB).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, post.id);

    favorites.remove_favorite(BOB, post.id).await.unwrap();
    assert!(matches!(
        favorites.remove_favorite(BOB, post.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(favorites.list_favorites(BOB).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_cannot_favorite_invisible_post() {
    let pool = setup().await;
    let posts = post_service(&pool);
    let favorites = FavoriteService::new(pool.clone());

    let draft = posts.create_post(ALICE, &input("Draft", "body", false)).await.unwrap();

    assert!(matches!(
        favorites.add_favorite(BOB, draft.id).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(
        favorites.add_favorite(ALICE, draft.id).await.unwrap(),
        FavoriteOutcome::Added
    );
}

// ============================================
// Delete cascade and search side effects
// ============================================

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_delete_removes_dependents() {
    let pool = setup().await;
    let posts = post_service(&pool);
    let comments = CommentService::new(pool.clone());
    let favorites = FavoriteService::new(pool.clone());
    let media = MediaService::new(pool.clone(), Arc::new(permissive_store()), 1024);

    let post = posts.create_post(ALICE, &input("Doomed", "body", true)).await.unwrap();
    comments.create_comment(BOB, post.id, "first").await.unwrap();
    favorites.add_favorite(BOB, post.id).await.unwrap();
    let uploaded = media
        .upload(
            ALICE,
            UploadedFile {
                filename: "cover.png".into(),
                content_type: "image/png".into(),
                data: vec![1, 2, 3],
            },
            Some(post.id),
        )
        .await
        .unwrap();
    assert!(uploaded.url.ends_with(".png"));

    posts.delete_post(ALICE, post.id).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    assert!(comment_repo::get_comments_by_post(&mut *conn, post.id)
        .await
        .unwrap()
        .is_empty());
    assert!(media_for_post(&pool, post.id)
        .await
        .unwrap()
        .is_empty());
    let visible = blog_service::access::visibility_predicate(BOB);
    assert!(favorite_repo::list_favorite_posts(&mut *conn, BOB, &visible)
        .await
        .unwrap()
        .is_empty());
    assert!(matches!(
        posts.get_post(ALICE, post.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_upload_to_foreign_post_is_not_found() {
    let pool = setup().await;
    let posts = post_service(&pool);

    let mut store = MockStore::new();
    store.expect_put_object().times(0);
    let media = MediaService::new(pool.clone(), Arc::new(store), 1024);

    let post = posts.create_post(ALICE, &input("Mine", "body", true)).await.unwrap();
    let result = media
        .upload(
            BOB,
            UploadedFile {
                filename: "cover.jpg".into(),
                content_type: "image/jpeg".into(),
                data: vec![1, 2, 3],
            },
            Some(post.id),
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_delete_succeeds_when_index_removal_fails() {
    let pool = setup().await;

    let mut index = MockIndex::new();
    index.expect_index_post().returning(|_| Ok(()));
    index.expect_delete_post().times(1).returning(|_| {
        Err(SearchError::Status {
            status: 503,
            body: "unavailable".into(),
        })
    });
    let posts = PostService::new(pool.clone(), Arc::new(index), Arc::new(permissive_queue()));

    let post = posts.create_post(ALICE, &input("Gone", "body", true)).await.unwrap();
    posts.delete_post(ALICE, post.id).await.unwrap();

    assert!(matches!(
        posts.get_post(ALICE, post.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_index_failure_after_commit_is_upstream_error() {
    let pool = setup().await;

    let mut index = MockIndex::new();
    index.expect_index_post().returning(|_| {
        Err(SearchError::Status {
            status: 503,
            body: "unavailable".into(),
        })
    });
    let posts = PostService::new(pool.clone(), Arc::new(index), Arc::new(permissive_queue()));

    let result = posts.create_post(ALICE, &input("Stored", "body", true)).await;
    assert!(matches!(result, Err(AppError::Upstream(_))));

    // The store write was committed before indexing
    let listed = posts.list_posts(ALICE, &ListFilter::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Stored");
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_keywords_dispatched_only_when_content_changes() {
    let pool = setup().await;

    let mut queue = MockQueue::new();
    queue
        .expect_enqueue()
        .with(always())
        .times(2)
        .returning(|_| Ok(()));
    let posts = PostService::new(pool.clone(), Arc::new(permissive_index()), Arc::new(queue));

    let post = posts
        .create_post(ALICE, &input("Kw", "rust ownership rules", true))
        .await
        .unwrap();

    // Title only: no dispatch
    posts
        .patch_post(
            ALICE,
            post.id,
            &PostPatch {
                title: Some("Kw 2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    posts
        .patch_post(
            ALICE,
            post.id,
            &PostPatch {
                content: Some("borrow checker".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_queue_failure_does_not_fail_write() {
    let pool = setup().await;

    let mut queue = MockQueue::new();
    queue.expect_enqueue().returning(|_| {
        Err(blog_service::jobs::keywords::QueueError::Redis(
            redis::RedisError::from((redis::ErrorKind::IoError, "connection refused")),
        ))
    });
    let posts = PostService::new(pool.clone(), Arc::new(permissive_index()), Arc::new(queue));

    let post = posts
        .create_post(ALICE, &input("Resilient", "some content", true))
        .await
        .unwrap();
    assert_eq!(post.title, "Resilient");
}

// ============================================
// Keyword worker
// ============================================

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_process_job_stores_keywords() {
    let pool = setup().await;
    let posts = post_service(&pool);

    let post = posts
        .create_post(
            ALICE,
            &input(
                "Ownership",
                "Rust ownership explained. Rust ownership keeps memory safe.",
                true,
            ),
        )
        .await
        .unwrap();

    let outcome = process_job(
        &pool,
        &KeywordJob {
            post_id: post.id,
            content: post.content.clone(),
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome, JobOutcome::Updated);

    let stored = posts.get_post(ALICE, post.id).await.unwrap();
    let keywords = stored.keywords.expect("keywords stored");
    assert!(keywords.starts_with("rust ownership"));

    let outcome = process_job(
        &pool,
        &KeywordJob {
            post_id: 999_999,
            content: "orphaned content here".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome, JobOutcome::PostMissing);

    let outcome = process_job(
        &pool,
        &KeywordJob {
            post_id: post.id,
            content: "the and of".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome, JobOutcome::Empty);
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_search_document_reflects_patched_post() {
    let pool = setup().await;

    let mut index = MockIndex::new();
    index
        .expect_index_post()
        .withf(|doc| doc.title == "Fresh")
        .times(1)
        .returning(|_| Ok(()));
    index
        .expect_index_post()
        .withf(|doc| doc.title == "Updated" && doc.content == "Fresh body")
        .times(1)
        .returning(|_| Ok(()));
    let posts = PostService::new(pool.clone(), Arc::new(index), Arc::new(permissive_queue()));

    let post = posts
        .create_post(ALICE, &input("Fresh", "Fresh body", true))
        .await
        .unwrap();
    posts
        .patch_post(
            ALICE,
            post.id,
            &PostPatch {
                title: Some("Updated".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}
