use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use penstroke_api_types::CreatePostRequest;

use crate::application::{listing::ListingError, posts::CreatePostError};

use super::{
    ApiState,
    error::{ApiError, codes, repo_to_api},
};

pub async fn list_posts(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state.listing.list_posts().await.map_err(listing_to_api)?;
    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<ApiState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload
        .map_err(|err| ApiError::bad_request("Malformed request body", Some(err.body_text())))?;

    let created = state
        .posts
        .create_post(request)
        .await
        .map_err(create_to_api)?;

    Ok((StatusCode::CREATED, Json(created)))
}

fn listing_to_api(err: ListingError) -> ApiError {
    match err {
        ListingError::Repo(err) => repo_to_api(err),
        ListingError::Format(err) => ApiError::internal(err.to_string()),
    }
}

fn create_to_api(err: CreatePostError) -> ApiError {
    match err {
        CreatePostError::Unauthorized => ApiError::unauthorized(),
        CreatePostError::Invalid(fields) => ApiError::validation(fields),
        CreatePostError::SlugExhausted { base } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "No free slug for this title",
            None,
        )
        .with_detail(format!("slug base {base}")),
        CreatePostError::Repo(err) => repo_to_api(err),
        CreatePostError::Domain(err) => ApiError::internal(err.to_string()),
    }
}
