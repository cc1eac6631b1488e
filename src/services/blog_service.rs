//! src/services/blog_service.rs
//!
//! Blog post repository. Public queries are filtered by the publication
//! gate (`published = 1`); the published listing paginates by keyset
//! (`created_at, id` descending) behind an opaque base64 cursor so the
//! page stays stable under concurrent inserts.

use crate::models::blog::BlogPost;
use crate::services::{ContentError, ContentResult};
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use sqlx::types::Json;
use std::sync::Arc;
use uuid::Uuid;

const SELECT_POST: &str = "SELECT id, title, slug, excerpt, content, author, author_id, \
     category, tags, featured_image, published, created_at, updated_at FROM blog_posts";

/// Fields accepted when creating a post. Slug, timestamps and author id
/// are server-assigned.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub published: Option<bool>,
}

/// One page of published posts plus the continuation marker.
#[derive(Debug)]
pub struct PostPage {
    pub posts: Vec<BlogPost>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Derive a URL-safe slug from a title: lowercase, strip everything
/// outside `[a-z0-9 -]`, spaces to hyphens, collapse runs of hyphens.
/// Deterministic, and a no-op on an already-slugified string.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut last_hyphen = true; // swallow leading hyphens
    for c in kept.trim().chars() {
        let c = if c == ' ' { '-' } else { c };
        if c == '-' {
            if !last_hyphen {
                slug.push('-');
            }
            last_hyphen = true;
        } else {
            slug.push(c);
            last_hyphen = false;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn encode_cursor(created_at: DateTime<Utc>, id: Uuid) -> String {
    general_purpose::STANDARD.encode(format!("{}|{}", created_at.to_rfc3339(), id))
}

fn decode_cursor(cursor: &str) -> ContentResult<(DateTime<Utc>, Uuid)> {
    let invalid = || ContentError::Validation("invalid pagination cursor".into());
    let raw = general_purpose::STANDARD
        .decode(cursor)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(invalid)?;
    let (ts, id) = raw.split_once('|').ok_or_else(invalid)?;
    let created_at = DateTime::parse_from_rfc3339(ts)
        .map_err(|_| invalid())?
        .with_timezone(&Utc);
    let id = Uuid::parse_str(id).map_err(|_| invalid())?;
    Ok((created_at, id))
}

#[derive(Clone)]
pub struct BlogService {
    pub db: Arc<SqlitePool>,
}

impl BlogService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert a post as draft or published. The slug is derived from the
    /// title here and is not checked for collisions.
    pub async fn create(&self, new: NewPost, author_id: &str) -> ContentResult<BlogPost> {
        if new.title.trim().is_empty() {
            return Err(ContentError::Validation("title is required".into()));
        }
        if new.content.trim().is_empty() {
            return Err(ContentError::Validation("content is required".into()));
        }

        let now = Utc::now();
        let post = sqlx::query_as::<_, BlogPost>(
            "INSERT INTO blog_posts (id, title, slug, excerpt, content, author, author_id, \
             category, tags, featured_image, published, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id, title, slug, excerpt, content, author, author_id, category, tags, \
             featured_image, published, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.title.trim())
        .bind(slugify(&new.title))
        .bind(&new.excerpt)
        .bind(&new.content)
        .bind(&new.author)
        .bind(author_id)
        .bind(&new.category)
        .bind(Json(new.tags))
        .bind(&new.featured_image)
        .bind(new.published)
        .bind(now)
        .bind(now)
        .fetch_one(&*self.db)
        .await?;

        Ok(post)
    }

    /// Admin view: every post, newest first, drafts included.
    pub async fn get_all(&self) -> ContentResult<Vec<BlogPost>> {
        let posts = sqlx::query_as::<_, BlogPost>(
            &format!("{} ORDER BY created_at DESC", SELECT_POST),
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(posts)
    }

    pub async fn get_by_id(&self, id: Uuid) -> ContentResult<BlogPost> {
        sqlx::query_as::<_, BlogPost>(&format!("{} WHERE id = ?", SELECT_POST))
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or(ContentError::NotFound {
                collection: "blog post",
                id,
            })
    }

    /// Slug lookup for the public article page. Unpublished posts are
    /// invisible here until `published` flips — the publication gate.
    pub async fn get_by_slug(&self, slug: &str) -> ContentResult<Option<BlogPost>> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "{} WHERE slug = ? AND published = 1 LIMIT 1",
            SELECT_POST
        ))
        .bind(slug)
        .fetch_optional(&*self.db)
        .await?;
        Ok(post)
    }

    /// Published posts, newest first, keyset-paginated. Fetches one row
    /// past the page size to decide `has_more` without a count query.
    pub async fn get_published(
        &self,
        page_size: usize,
        cursor: Option<&str>,
    ) -> ContentResult<PostPage> {
        let page_size = page_size.clamp(1, 100);
        let fetch_limit = page_size + 1;

        let mut posts = match cursor {
            Some(cursor) => {
                let (after_ts, after_id) = decode_cursor(cursor)?;
                sqlx::query_as::<_, BlogPost>(&format!(
                    "{} WHERE published = 1 AND (created_at < ? OR (created_at = ? AND id < ?)) \
                     ORDER BY created_at DESC, id DESC LIMIT ?",
                    SELECT_POST
                ))
                .bind(after_ts)
                .bind(after_ts)
                .bind(after_id)
                .bind(fetch_limit as i64)
                .fetch_all(&*self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, BlogPost>(&format!(
                    "{} WHERE published = 1 ORDER BY created_at DESC, id DESC LIMIT ?",
                    SELECT_POST
                ))
                .bind(fetch_limit as i64)
                .fetch_all(&*self.db)
                .await?
            }
        };

        let mut has_more = false;
        if posts.len() == fetch_limit {
            posts.pop();
            has_more = true;
        }
        let next_cursor = if has_more {
            posts.last().map(|p| encode_cursor(p.created_at, p.id))
        } else {
            None
        };

        Ok(PostPage {
            posts,
            next_cursor,
            has_more,
        })
    }

    /// Published posts in a category, newest first, bounded window.
    pub async fn get_by_category(
        &self,
        category: &str,
        page_size: usize,
    ) -> ContentResult<Vec<BlogPost>> {
        let posts = sqlx::query_as::<_, BlogPost>(&format!(
            "{} WHERE category = ? AND published = 1 ORDER BY created_at DESC LIMIT ?",
            SELECT_POST
        ))
        .bind(category)
        .bind(page_size.clamp(1, 100) as i64)
        .fetch_all(&*self.db)
        .await?;
        Ok(posts)
    }

    /// Partial update. Last writer wins; there is no concurrency token.
    pub async fn update(&self, id: Uuid, patch: PostPatch) -> ContentResult<()> {
        let existing = self.get_by_id(id).await?;

        let title = patch.title.unwrap_or(existing.title);
        let excerpt = patch.excerpt.unwrap_or(existing.excerpt);
        let content = patch.content.unwrap_or(existing.content);
        let category = patch.category.unwrap_or(existing.category);
        let tags = patch.tags.map(Json).unwrap_or(existing.tags);
        let featured_image = patch.featured_image.or(existing.featured_image);
        let published = patch.published.unwrap_or(existing.published);

        sqlx::query(
            "UPDATE blog_posts SET title = ?, excerpt = ?, content = ?, category = ?, \
             tags = ?, featured_image = ?, published = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&title)
        .bind(&excerpt)
        .bind(&content)
        .bind(&category)
        .bind(tags)
        .bind(&featured_image)
        .bind(published)
        .bind(Utc::now())
        .bind(id)
        .execute(&*self.db)
        .await?;

        Ok(())
    }

    /// Hard delete, no recovery. Deleting an absent id fails.
    pub async fn delete(&self, id: Uuid) -> ContentResult<()> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound {
                collection: "blog post",
                id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;
    use std::collections::HashSet;

    fn draft(title: &str, published: bool) -> NewPost {
        NewPost {
            title: title.to_string(),
            excerpt: "teaser".into(),
            content: "body text".into(),
            author: "Jo".into(),
            category: "ndt".into(),
            tags: vec!["inspection".into()],
            featured_image: None,
            published,
        }
    }

    #[test]
    fn slugify_strips_and_collapses() {
        assert_eq!(slugify("Hello, World!  Test"), "hello-world-test");
        assert_eq!(slugify("  --Already-Slugged--  "), "already-slugged");
        // Idempotent: re-slugifying is a no-op.
        assert_eq!(slugify("hello-world-test"), "hello-world-test");
        assert_eq!(slugify(slugify("Ündt & Co. Review").as_str()), slugify("Ündt & Co. Review"));
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (db, _dir) = test_pool().await;
        let blog = BlogService::new(db);

        let created = blog.create(draft("First Post", false), "uid-1").await.unwrap();
        assert_eq!(created.slug, "first-post");
        assert_eq!(created.author_id, "uid-1");

        let fetched = blog.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.title, "First Post");
        assert_eq!(fetched.tags.0, vec!["inspection".to_string()]);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn create_rejects_missing_required_fields() {
        let (db, _dir) = test_pool().await;
        let blog = BlogService::new(db);

        let mut post = draft("  ", true);
        let err = blog.create(post, "uid-1").await.unwrap_err();
        assert!(matches!(err, ContentError::Validation(_)));

        post = draft("Ok title", true);
        post.content = "".into();
        let err = blog.create(post, "uid-1").await.unwrap_err();
        assert!(matches!(err, ContentError::Validation(_)));
    }

    #[tokio::test]
    async fn publication_gate_hides_drafts() {
        let (db, _dir) = test_pool().await;
        let blog = BlogService::new(db);

        let post = blog.create(draft("Hidden Draft", false), "uid-1").await.unwrap();

        assert!(blog.get_by_slug("hidden-draft").await.unwrap().is_none());
        let page = blog.get_published(10, None).await.unwrap();
        assert!(page.posts.is_empty());

        blog.update(
            post.id,
            PostPatch {
                title: None,
                excerpt: None,
                content: None,
                category: None,
                tags: None,
                featured_image: None,
                published: Some(true),
            },
        )
        .await
        .unwrap();

        assert!(blog.get_by_slug("hidden-draft").await.unwrap().is_some());
        let page = blog.get_published(10, None).await.unwrap();
        assert_eq!(page.posts.len(), 1);

        let by_cat = blog.get_by_category("ndt", 10).await.unwrap();
        assert_eq!(by_cat.len(), 1);
    }

    #[tokio::test]
    async fn pagination_never_repeats_and_flags_has_more() {
        let (db, _dir) = test_pool().await;
        let blog = BlogService::new(db);

        for i in 0..7 {
            blog.create(draft(&format!("Post {}", i), true), "uid-1")
                .await
                .unwrap();
        }

        let mut seen = HashSet::new();
        let first = blog.get_published(3, None).await.unwrap();
        assert_eq!(first.posts.len(), 3);
        assert!(first.has_more);
        seen.extend(first.posts.iter().map(|p| p.id));

        let second = blog
            .get_published(3, first.next_cursor.as_deref())
            .await
            .unwrap();
        assert_eq!(second.posts.len(), 3);
        assert!(second.has_more);
        for p in &second.posts {
            assert!(seen.insert(p.id), "page re-returned a seen post");
        }

        let third = blog
            .get_published(3, second.next_cursor.as_deref())
            .await
            .unwrap();
        assert_eq!(third.posts.len(), 1);
        assert!(!third.has_more);
        assert!(third.next_cursor.is_none());
        for p in &third.posts {
            assert!(seen.insert(p.id));
        }
        assert_eq!(seen.len(), 7);
    }

    #[tokio::test]
    async fn bad_cursor_is_a_validation_error() {
        let (db, _dir) = test_pool().await;
        let blog = BlogService::new(db);
        let err = blog.get_published(5, Some("@@not-base64@@")).await.unwrap_err();
        assert!(matches!(err, ContentError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_is_hard_and_not_idempotent() {
        let (db, _dir) = test_pool().await;
        let blog = BlogService::new(db);

        let post = blog.create(draft("Gone Soon", true), "uid-1").await.unwrap();
        blog.delete(post.id).await.unwrap();

        assert!(matches!(
            blog.get_by_id(post.id).await.unwrap_err(),
            ContentError::NotFound { .. }
        ));
        assert!(matches!(
            blog.delete(post.id).await.unwrap_err(),
            ContentError::NotFound { .. }
        ));
    }
}
