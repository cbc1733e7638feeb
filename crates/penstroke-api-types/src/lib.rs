//! Wire types shared by the penstroke server and its clients.
//!
//! The draft schema lives here as well so the server's creation endpoint and
//! the client-side composer reject exactly the same drafts.

mod error;
mod posts;
pub mod schema;

pub use error::{ApiErrorBody, ApiErrorMessage};
pub use posts::{CreatePostRequest, CreatePostResponse, PostSummaryView};
pub use schema::{
    DraftField, DraftPost, DraftSchema, FieldConstraint, FieldErrors, SchemaError, validate,
};
