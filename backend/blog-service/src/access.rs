//! Post visibility and ownership rules.
//!
//! Every query that reads or mutates posts goes through a [`Predicate`] built
//! here. The same tree renders into SQL (bound parameters only) for the store
//! and evaluates in memory against a [`Post`], so the storage filter and the
//! documented rule cannot drift apart.
//!
//! Rules:
//! - a post is visible to requester R iff `published OR author_id = R`
//! - a post is mutable by requester R iff `author_id = R`
//! - a post that is not visible or not owned is reported as not found

use crate::models::Post;
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

/// Boolean filter over the `posts` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `posts.published = <value>`
    Published(bool),
    /// `posts.author_id = <value>`
    AuthorIs(String),
    /// Conjunction; empty is always true
    And(Vec<Predicate>),
    /// Disjunction; empty is always false
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Evaluate against a post already in memory
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Predicate::Published(value) => post.published == *value,
            Predicate::AuthorIs(author) => post.author_id == *author,
            Predicate::And(parts) => parts.iter().all(|p| p.matches(post)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(post)),
        }
    }

    /// Append this predicate to a query that selects from `posts`
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Predicate::Published(value) => {
                qb.push("posts.published = ");
                qb.push_bind(*value);
            }
            Predicate::AuthorIs(author) => {
                qb.push("posts.author_id = ");
                qb.push_bind(author.clone());
            }
            Predicate::And(parts) => push_group(qb, parts, " AND ", "TRUE"),
            Predicate::Or(parts) => push_group(qb, parts, " OR ", "FALSE"),
        }
    }
}

fn push_group(
    qb: &mut QueryBuilder<'_, Postgres>,
    parts: &[Predicate],
    separator: &str,
    empty: &str,
) {
    if parts.is_empty() {
        qb.push(empty);
        return;
    }

    qb.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        part.push_sql(qb);
    }
    qb.push(")");
}

/// Filters accepted by the post listing (`?published=&author_id=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilter {
    /// Tri-state: unset lists everything visible
    pub published: Option<bool>,
    /// Restrict to a single author; an empty string counts as absent
    pub author_id: Option<String>,
}

/// Predicate for listing posts on behalf of `requester`.
///
/// - `published = Some(true)`: published posts only
/// - `published = Some(false)`: the requester's own drafts only
/// - `published = None`: published posts plus the requester's drafts
///
/// An author filter is AND-ed with the above. Asking for another author's
/// drafts therefore yields an empty result rather than an error.
pub fn list_predicate(requester: &str, filter: &ListFilter) -> Predicate {
    let own_drafts = Predicate::And(vec![
        Predicate::Published(false),
        Predicate::AuthorIs(requester.to_string()),
    ]);

    let published = match filter.published {
        Some(true) => Predicate::Published(true),
        Some(false) => own_drafts,
        None => Predicate::Or(vec![Predicate::Published(true), own_drafts]),
    };

    match filter.author_id.as_deref().filter(|a| !a.is_empty()) {
        Some(author) => Predicate::And(vec![Predicate::AuthorIs(author.to_string()), published]),
        None => published,
    }
}

/// Predicate for reading a single post
pub fn visibility_predicate(requester: &str) -> Predicate {
    Predicate::Or(vec![
        Predicate::Published(true),
        Predicate::AuthorIs(requester.to_string()),
    ])
}

/// Predicate a post must satisfy before `requester` may update or delete it
pub fn ownership_predicate(requester: &str) -> Predicate {
    Predicate::AuthorIs(requester.to_string())
}
