use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    application::{
        error::HttpError, listing::ListingService, posts::PostCreationService,
        reading::ReadingService, render::MarkdownRenderer, repos::HealthRepo,
    },
    presentation::views::{
        IndexTemplate, IndexView, LayoutChrome, LayoutContext, PostTemplate,
        render_not_found_response, render_template_response,
    },
};

use super::{RouterState, db_health_response};

#[derive(Clone)]
pub struct HttpState {
    pub listing: Arc<ListingService>,
    pub reading: Arc<ReadingService>,
    pub posts: Arc<PostCreationService>,
    pub renderer: Arc<MarkdownRenderer>,
    pub health: Arc<dyn HealthRepo>,
    pub chrome: LayoutChrome,
}

pub fn build_public_router() -> Router<RouterState> {
    Router::new()
        .route("/", get(index))
        .route("/_health/db", get(public_health))
        .route("/{slug}", get(post_detail))
        .fallback(not_found)
}

async fn index(State(state): State<HttpState>) -> Response {
    match state.listing.list_posts().await {
        Ok(posts) => {
            let chrome = state.chrome.clone().with_page_title("Blog");
            let view = LayoutContext::new(chrome, IndexView { posts });
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn post_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    match state.reading.post_view(&slug).await {
        Ok(Some(post)) => {
            let chrome = state.chrome.clone().with_page_title(&post.title);
            let view = LayoutContext::new(chrome, post);
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(state.chrome.clone()),
        Err(err) => err.into_response(),
    }
}

async fn not_found(State(state): State<HttpState>) -> Response {
    render_not_found_response(state.chrome.clone())
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.health.health_check().await)
}
