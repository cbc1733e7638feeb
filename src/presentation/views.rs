use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use penstroke_api_types::{DraftField, DraftPost, FieldErrors, PostSummaryView};
use thiserror::Error;

use crate::application::error::{ErrorReport, HttpError};

pub const SUCCESS_MESSAGE: &str = "Post created successfully 🎉 click to go.";
pub const FAILURE_MESSAGE: &str = "Something went wrong 😔";

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let chrome = chrome.with_page_title("Not Found");
    let view = LayoutContext::new(chrome, ErrorPageView::not_found());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// Page furniture shared by every template.
#[derive(Clone, Debug)]
pub struct LayoutChrome {
    pub site_title: String,
    pub page_title: String,
}

impl LayoutChrome {
    pub fn new(site_title: impl Into<String>) -> Self {
        let site_title = site_title.into();
        Self {
            page_title: site_title.clone(),
            site_title,
        }
    }

    /// `{page} | {site}`, the way browser tabs show it.
    pub fn with_page_title(self, page: &str) -> Self {
        Self {
            page_title: format!("{page} | {}", self.site_title),
            ..self
        }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub site_title: String,
    pub page_title: String,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            site_title: chrome.site_title,
            page_title: chrome.page_title,
            content,
        }
    }
}

#[derive(Clone)]
pub struct IndexView {
    pub posts: Vec<PostSummaryView>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<IndexView>,
}

#[derive(Clone, Debug)]
pub struct PostDetailView {
    pub slug: String,
    pub title: String,
    pub preview: String,
    pub created_at: String,
    /// Sanitized HTML rendered from the post's markdown.
    pub content_html: String,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailView>,
}

#[derive(Clone)]
pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist.".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

/// One input on the create page with its current value and messages.
#[derive(Clone, Debug)]
pub struct ComposerFieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub multiline: bool,
    pub messages: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct NotificationView {
    pub kind: &'static str,
    pub message: &'static str,
    pub href: Option<String>,
}

impl NotificationView {
    pub fn post_created(slug: &str) -> Self {
        Self {
            kind: "success",
            message: SUCCESS_MESSAGE,
            href: Some(format!("/{slug}")),
        }
    }

    pub fn failed() -> Self {
        Self {
            kind: "error",
            message: FAILURE_MESSAGE,
            href: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ComposerView {
    pub fields: Vec<ComposerFieldView>,
    pub submit_enabled: bool,
    pub preview_html: Option<String>,
    pub notification: Option<NotificationView>,
}

impl ComposerView {
    /// Build the form for `draft`. The submitter key is never rendered.
    pub fn new(draft: &DraftPost, errors: &FieldErrors) -> Self {
        let fields = [
            (DraftField::Title, "Title", false),
            (DraftField::Preview, "Preview", true),
            (DraftField::Content, "Content", true),
        ]
        .into_iter()
        .map(|(field, label, multiline)| ComposerFieldView {
            name: field.as_str(),
            label,
            value: draft.get(field).unwrap_or_default().to_string(),
            multiline,
            messages: errors.messages(field).to_vec(),
        })
        .collect();

        Self {
            fields,
            submit_enabled: errors.is_empty(),
            preview_html: None,
            notification: None,
        }
    }

    /// Hide messages on a form the user has not touched yet. Submit stays
    /// disabled while the draft is invalid.
    pub fn pristine(self) -> Self {
        let fields = self
            .fields
            .into_iter()
            .map(|field| ComposerFieldView {
                messages: Vec::new(),
                ..field
            })
            .collect();
        Self { fields, ..self }
    }

    pub fn with_preview(self, html: String) -> Self {
        Self {
            preview_html: Some(html),
            ..self
        }
    }

    pub fn with_notification(self, notification: NotificationView) -> Self {
        Self {
            notification: Some(notification),
            ..self
        }
    }
}

#[derive(Template)]
#[template(path = "create.html")]
pub struct CreateTemplate {
    pub view: LayoutContext<ComposerView>,
}
