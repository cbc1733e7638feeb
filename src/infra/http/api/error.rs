use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use penstroke_api_types::{ApiErrorBody, ApiErrorMessage, FieldErrors};

use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const VALIDATION: &str = "validation_failed";
    pub const DUPLICATE: &str = "duplicate";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const INTEGRITY: &str = "integrity_error";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const REPO: &str = "repo_error";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
    fields: Option<FieldErrors>,
    /// Logged through the attached report, never serialized.
    detail: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
            fields: None,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            codes::UNAUTHORIZED,
            "Submitter key rejected",
            None,
        )
    }

    /// 422 carrying the per-field messages.
    pub fn validation(fields: FieldErrors) -> Self {
        Self {
            fields: Some(fields),
            ..Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                codes::VALIDATION,
                "Draft failed validation",
                None,
            )
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL,
            "Internal server error",
            None,
        )
        .with_detail(detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match (&self.detail, &self.fields, &self.hint) {
            (Some(detail), _, _) => detail.clone(),
            (None, Some(fields), _) => fields.to_string(),
            (None, None, Some(hint)) => hint.clone(),
            (None, None, None) => self.message.to_string(),
        };
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
                fields: self.fields,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            "infra::http::api",
            self.status,
            format!("{}: {detail}", self.code),
        )
        .attach(&mut response);
        response
    }
}

/// Storage failures reach the client as a code and a fixed message only.
pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            None,
        )
        .with_detail(format!("constraint {constraint}")),
        RepoError::NotFound => ApiError::new(
            StatusCode::NOT_FOUND,
            codes::REPO,
            "Resource not found",
            None,
        ),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            None,
        )
        .with_detail(message),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            None,
        )
        .with_detail(message),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            None,
        )
        .with_detail(message),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_and_report(error: ApiError) -> (String, ErrorReport) {
        let response = error.into_response();
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .cloned()
            .expect("report attached");
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (String::from_utf8(bytes.to_vec()).expect("utf-8"), report)
    }

    #[tokio::test]
    async fn persistence_detail_is_logged_not_returned() {
        let secret = "password authentication failed for user \"blog_admin\"";
        let (body, report) =
            body_and_report(repo_to_api(RepoError::Persistence(secret.into()))).await;

        assert!(!body.contains("blog_admin"));
        assert!(!body.contains("hint"));
        assert!(report.messages[0].contains("blog_admin"));
    }

    #[tokio::test]
    async fn constraint_names_stay_server_side() {
        let (body, report) = body_and_report(repo_to_api(RepoError::Duplicate {
            constraint: "posts_slug_key".into(),
        }))
        .await;

        assert!(!body.contains("posts_slug_key"));
        assert!(report.messages[0].contains("posts_slug_key"));
    }

    #[tokio::test]
    async fn internal_errors_hide_their_detail() {
        let (body, _) = body_and_report(ApiError::internal("invariant broken: x")).await;
        assert!(!body.contains("invariant"));
        assert!(body.contains("internal_error"));
    }
}
