//! ArticleService: CRUD for blog articles with slug handling.

use super::{ServiceError, ServiceResult, is_unique_violation};
use crate::models::article::{Article, ArticleInput};
use chrono::Utc;
use sqlx::{SqlitePool, types::Json};
use std::sync::Arc;
use uuid::Uuid;

const ARTICLE_COLUMNS: &str = "id, title, content, excerpt, slug, featured_image, \
     meta_title, meta_description, alt_text, tags, created_at, updated_at";

/// URL-safe slug: lowercase ASCII alphanumerics joined by single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[derive(Clone)]
pub struct ArticleService {
    db: Arc<SqlitePool>,
}

impl ArticleService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Newest first.
    pub async fn list(&self) -> ServiceResult<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&*self.db)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_slug(&self, slug: &str) -> ServiceResult<Article> {
        sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("article `{slug}`")))
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Article> {
        sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("article `{id}`")))
    }

    /// Create an article. Without an explicit slug one is derived from the title.
    pub async fn create(&self, input: ArticleInput) -> ServiceResult<Article> {
        validate(&input)?;
        let slug = resolve_slug(input.slug.as_deref(), &input.title)?;
        let now = Utc::now();

        sqlx::query_as::<_, Article>(&format!(
            "INSERT INTO articles (
                id, title, content, excerpt, slug, featured_image,
                meta_title, meta_description, alt_text, tags, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(input.title.trim())
        .bind(&input.content)
        .bind(&input.excerpt)
        .bind(&slug)
        .bind(input.featured_image)
        .bind(input.meta_title)
        .bind(input.meta_description)
        .bind(input.alt_text)
        .bind(input.tags.map(Json))
        .bind(now)
        .bind(now)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| slug_conflict(err, &slug))
    }

    /// Update an article. The stored slug is kept unless a new one is given.
    pub async fn update(&self, id: Uuid, input: ArticleInput) -> ServiceResult<Article> {
        validate(&input)?;
        let current = self.get(id).await?;
        let slug = match input.slug.as_deref() {
            Some(explicit) => resolve_slug(Some(explicit), &input.title)?,
            None => current.slug,
        };

        sqlx::query_as::<_, Article>(&format!(
            "UPDATE articles SET
                title = ?, content = ?, excerpt = ?, slug = ?, featured_image = ?,
                meta_title = ?, meta_description = ?, alt_text = ?, tags = ?, updated_at = ?
             WHERE id = ?
             RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(input.title.trim())
        .bind(&input.content)
        .bind(&input.excerpt)
        .bind(&slug)
        .bind(input.featured_image)
        .bind(input.meta_title)
        .bind(input.meta_description)
        .bind(input.alt_text)
        .bind(input.tags.map(Json))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&*self.db)
        .await
        .map_err(|err| slug_conflict(err, &slug))?
        .ok_or_else(|| ServiceError::NotFound(format!("article `{id}`")))
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("article `{id}`")));
        }
        Ok(())
    }
}

fn validate(input: &ArticleInput) -> ServiceResult<()> {
    if input.title.trim().is_empty() {
        return Err(ServiceError::Validation("title is required".into()));
    }
    if input.content.trim().is_empty() {
        return Err(ServiceError::Validation("content is required".into()));
    }
    Ok(())
}

fn resolve_slug(explicit: Option<&str>, title: &str) -> ServiceResult<String> {
    let slug = slugify(explicit.filter(|s| !s.trim().is_empty()).unwrap_or(title));
    if slug.is_empty() {
        return Err(ServiceError::Validation(
            "slug must contain at least one letter or digit".into(),
        ));
    }
    Ok(slug)
}

fn slug_conflict(err: sqlx::Error, slug: &str) -> ServiceError {
    if is_unique_violation(&err) {
        ServiceError::Conflict(format!("an article with slug `{slug}` already exists"))
    } else {
        ServiceError::Sqlx(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::memory_pool;

    fn input(title: &str) -> ArticleInput {
        ArticleInput {
            title: title.into(),
            content: "Body".into(),
            excerpt: "Short".into(),
            tags: Some(vec!["news".into(), "csr".into()]),
            ..Default::default()
        }
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  CSR   Visit -- 2024 "), "csr-visit-2024");
        assert_eq!(slugify("Café déjà vu"), "caf-d-j-vu");
        assert_eq!(slugify("!!!"), "");
    }

    #[tokio::test]
    async fn create_derives_slug_and_round_trips_tags() {
        let service = ArticleService::new(memory_pool().await);
        let article = service.create(input("Our First Post")).await.unwrap();
        assert_eq!(article.slug, "our-first-post");
        assert_eq!(
            article.tags.as_ref().map(|t| t.0.clone()),
            Some(vec!["news".to_string(), "csr".to_string()])
        );

        let fetched = service.get_by_slug("our-first-post").await.unwrap();
        assert_eq!(fetched.id, article.id);
    }

    #[tokio::test]
    async fn update_keeps_slug_unless_given() {
        let service = ArticleService::new(memory_pool().await);
        let article = service.create(input("Original Title")).await.unwrap();

        let renamed = service
            .update(article.id, input("A Completely New Title"))
            .await
            .unwrap();
        assert_eq!(renamed.slug, "original-title");
        assert_eq!(renamed.title, "A Completely New Title");

        let mut with_slug = input("A Completely New Title");
        with_slug.slug = Some("New Slug".into());
        let reslugged = service.update(article.id, with_slug).await.unwrap();
        assert_eq!(reslugged.slug, "new-slug");
    }

    #[tokio::test]
    async fn duplicate_slugs_conflict() {
        let service = ArticleService::new(memory_pool().await);
        service.create(input("Same Title")).await.unwrap();
        let err = service.create(input("Same   title!")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn validation_and_delete() {
        let service = ArticleService::new(memory_pool().await);
        let mut empty = input("x");
        empty.content = " ".into();
        assert!(matches!(
            service.create(empty).await,
            Err(ServiceError::Validation(_))
        ));

        let article = service.create(input("Doomed")).await.unwrap();
        service.delete(article.id).await.unwrap();
        assert!(matches!(
            service.get_by_slug("doomed").await,
            Err(ServiceError::NotFound(_))
        ));
        assert_eq!(service.list().await.unwrap().len(), 0);
    }
}
