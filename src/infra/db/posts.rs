use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreatePostParams, PostsRepo, PostsWriteRepo, RepoError};
use crate::domain::entities::{PostRecord, PostSummaryRecord};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    slug: String,
    title: String,
    preview: String,
    content: String,
    created_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            preview: row.preview,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostSummaryRow {
    slug: String,
    title: String,
    preview: String,
    created_at: OffsetDateTime,
}

impl From<PostSummaryRow> for PostSummaryRecord {
    fn from(row: PostSummaryRow) -> Self {
        Self {
            slug: row.slug,
            title: row.title,
            preview: row.preview,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_post_summaries(&self) -> Result<Vec<PostSummaryRecord>, RepoError> {
        let rows = sqlx::query_as::<_, PostSummaryRow>(
            r#"
            SELECT slug, title, preview, created_at
            FROM posts
            ORDER BY created_at DESC, slug ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostSummaryRecord::from).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, slug, title, preview, content, created_at
            FROM posts
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, slug, title, preview, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, slug, title, preview, content, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&params.slug)
        .bind(&params.title)
        .bind(&params.preview)
        .bind(&params.content)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }
}
