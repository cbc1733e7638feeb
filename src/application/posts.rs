//! Post creation: key check, schema validation, unique slug, insert.

use std::sync::Arc;

use penstroke_api_types::{
    CreatePostRequest, CreatePostResponse, DraftField, DraftPost, DraftSchema, FieldErrors,
    validate,
};
use thiserror::Error;
use tracing::info;

use crate::application::{
    gate::AdminGate,
    repos::{CreatePostParams, PostsRepo, PostsWriteRepo, RepoError},
};
use crate::domain::{
    error::DomainError,
    slug::{SlugAsyncError, SlugError, generate_unique_slug_async, is_reserved},
};

#[derive(Debug, Error)]
pub enum CreatePostError {
    #[error("submitter key rejected")]
    Unauthorized,
    #[error("draft failed validation: {0}")]
    Invalid(FieldErrors),
    #[error("no free slug left for `{base}`")]
    SlugExhausted { base: String },
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Clone)]
pub struct PostCreationService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    gate: AdminGate,
    schema: DraftSchema,
}

impl PostCreationService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        gate: AdminGate,
        schema: DraftSchema,
    ) -> Self {
        Self {
            reader,
            writer,
            gate,
            schema,
        }
    }

    pub fn gate(&self) -> &AdminGate {
        &self.gate
    }

    pub fn schema(&self) -> &DraftSchema {
        &self.schema
    }

    /// Persist a post from a creation request.
    ///
    /// The key is checked before the draft, so a caller without the key learns
    /// nothing about the schema.
    pub async fn create_post(
        &self,
        request: CreatePostRequest,
    ) -> Result<CreatePostResponse, CreatePostError> {
        if !self.gate.verify(&request.submitter_key) {
            return Err(CreatePostError::Unauthorized);
        }

        let validated =
            validate(&DraftPost::from(request), &self.schema).map_err(CreatePostError::Invalid)?;

        let slug = self.unique_slug(&validated.title).await?;

        let record = self
            .writer
            .create_post(CreatePostParams {
                slug,
                title: validated.title,
                preview: validated.preview,
                content: validated.content,
            })
            .await?;

        info!(
            target = "penstroke::application::posts",
            slug = %record.slug,
            post_id = %record.id,
            "post created"
        );

        let created_at = record.created_at_http()?;
        Ok(CreatePostResponse {
            slug: record.slug,
            title: record.title,
            preview: record.preview,
            created_at,
        })
    }

    async fn unique_slug(&self, title: &str) -> Result<String, CreatePostError> {
        let reader = self.reader.clone();
        let result = generate_unique_slug_async(title, |candidate| {
            let reader = reader.clone();
            let candidate = candidate.to_string();
            async move {
                if is_reserved(&candidate) {
                    return Ok::<bool, RepoError>(false);
                }
                Ok(reader.find_by_slug(&candidate).await?.is_none())
            }
        })
        .await;

        match result {
            Ok(slug) => Ok(slug),
            Err(SlugAsyncError::Predicate(err)) => Err(CreatePostError::Repo(err)),
            Err(SlugAsyncError::Slug(SlugError::Exhausted { base })) => {
                Err(CreatePostError::SlugExhausted { base })
            }
            Err(SlugAsyncError::Slug(SlugError::EmptyInput | SlugError::Unrepresentable { .. })) => {
                Err(CreatePostError::Invalid(FieldErrors::single(
                    DraftField::Title,
                    "Must contain at least one letter or digit",
                )))
            }
        }
    }
}
