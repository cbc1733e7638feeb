//! The listing query: every post, newest first, without content.

use std::{cmp::Ordering, sync::Arc};

use penstroke_api_types::PostSummaryView;
use thiserror::Error;

use crate::application::repos::{PostsRepo, RepoError};
use crate::domain::{
    entities::{PostSummaryRecord, http_date},
    error::DomainError,
};

#[derive(Debug, Error)]
pub enum ListingError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Format(#[from] DomainError),
}

#[derive(Clone)]
pub struct ListingService {
    posts: Arc<dyn PostsRepo>,
}

impl ListingService {
    pub fn new(posts: Arc<dyn PostsRepo>) -> Self {
        Self { posts }
    }

    /// All posts ordered by creation time descending, ties broken by slug.
    pub async fn list_posts(&self) -> Result<Vec<PostSummaryView>, ListingError> {
        let mut records = self.posts.list_post_summaries().await?;
        records.sort_by(newest_first);

        records
            .into_iter()
            .map(|record| -> Result<PostSummaryView, ListingError> {
                let created_at = http_date(record.created_at)?;
                Ok(PostSummaryView {
                    slug: record.slug,
                    title: record.title,
                    preview: record.preview,
                    created_at,
                })
            })
            .collect()
    }
}

fn newest_first(a: &PostSummaryRecord, b: &PostSummaryRecord) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.slug.cmp(&b.slug))
}
