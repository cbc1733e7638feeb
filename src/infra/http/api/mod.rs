pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::application::{listing::ListingService, posts::PostCreationService};
use crate::infra::http::RouterState;

#[derive(Clone)]
pub struct ApiState {
    pub listing: Arc<ListingService>,
    pub posts: Arc<PostCreationService>,
}

pub fn build_api_router() -> Router<RouterState> {
    Router::new()
        .route("/api/posts", get(handlers::list_posts))
        .route("/api/post", post(handlers::create_post))
}
