use std::sync::Arc;

use axum::http::StatusCode;

use crate::application::{
    error::HttpError,
    render::MarkdownRenderer,
    repos::{PostsRepo, RepoError},
};
use crate::presentation::views::PostDetailView;

const SOURCE: &str = "application::reading::ReadingService";

/// Loads a single post for the reading view.
#[derive(Clone)]
pub struct ReadingService {
    posts: Arc<dyn PostsRepo>,
    renderer: Arc<MarkdownRenderer>,
}

impl ReadingService {
    pub fn new(posts: Arc<dyn PostsRepo>, renderer: Arc<MarkdownRenderer>) -> Self {
        Self { posts, renderer }
    }

    pub async fn post_view(&self, slug: &str) -> Result<Option<PostDetailView>, HttpError> {
        let record = self
            .posts
            .find_by_slug(slug)
            .await
            .map_err(|err| repo_failure("find_by_slug", err))?;

        let Some(record) = record else {
            return Ok(None);
        };

        let created_at = record.created_at_http().map_err(|err| {
            HttpError::from_error(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load post",
                &err,
            )
        })?;
        let content_html = self.renderer.render(&record.content);

        Ok(Some(PostDetailView {
            slug: record.slug,
            title: record.title,
            preview: record.preview,
            created_at,
            content_html,
        }))
    }
}

fn repo_failure(operation: &'static str, err: RepoError) -> HttpError {
    HttpError::new(
        SOURCE,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to load post",
        format!("{operation} failed: {err}"),
    )
}
