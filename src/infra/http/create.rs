//! The gated create page and its server-rendered composer.

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use penstroke_api_types::{DraftPost, FieldErrors, validate};
use serde::Deserialize;

use crate::{
    application::{error::ErrorReport, gate::ADMIN_KEY_COOKIE, posts::CreatePostError},
    presentation::views::{
        ComposerView, CreateTemplate, LayoutContext, NotificationView, render_template_response,
    },
};

use super::{HttpState, RouterState, repo_error_to_http};

const SOURCE: &str = "infra::http::create";

pub fn build_create_router() -> Router<RouterState> {
    Router::new().route("/create", get(create_page).post(submit_draft))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DraftForm {
    title: String,
    preview: String,
    content: String,
    intent: Intent,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Intent {
    /// Validate and show the rendered content without creating anything.
    Preview,
    #[default]
    Submit,
}

async fn create_page(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let Some(key) = admitted_key(&state, &jar) else {
        return Redirect::to("/").into_response();
    };

    let draft = DraftPost::for_submitter(key);
    let errors = field_errors(&state, &draft);
    let view = ComposerView::new(&draft, &errors).pristine();
    render_composer(&state, view, StatusCode::OK)
}

async fn submit_draft(
    State(state): State<HttpState>,
    jar: CookieJar,
    Form(form): Form<DraftForm>,
) -> Response {
    let Some(key) = admitted_key(&state, &jar) else {
        return Redirect::to("/").into_response();
    };

    let intent = form.intent;
    let draft = DraftPost {
        title: Some(form.title),
        preview: Some(form.preview),
        content: Some(form.content),
        submitter_key: Some(key),
    };

    let view = with_content_preview(
        &state,
        ComposerView::new(&draft, &FieldErrors::default()),
        &draft,
    );

    let request = match validate(&draft, state.posts.schema()) {
        Ok(request) => request,
        Err(errors) => return invalid_draft(&state, &draft, &errors),
    };

    if intent == Intent::Preview {
        return render_composer(&state, view, StatusCode::OK);
    }

    match state.posts.create_post(request).await {
        Ok(created) => render_composer(
            &state,
            view.with_notification(NotificationView::post_created(&created.slug)),
            StatusCode::CREATED,
        ),
        Err(CreatePostError::Invalid(errors)) => invalid_draft(&state, &draft, &errors),
        Err(CreatePostError::Unauthorized) => Redirect::to("/").into_response(),
        Err(CreatePostError::Repo(err)) => {
            let http = repo_error_to_http(SOURCE, err);
            let status = http.status();
            let mut response = render_composer(
                &state,
                view.with_notification(NotificationView::failed()),
                status,
            );
            http.into_report().attach(&mut response);
            response
        }
        Err(err @ CreatePostError::SlugExhausted { .. }) => {
            failed_submission(&state, view, StatusCode::CONFLICT, &err)
        }
        Err(err @ CreatePostError::Domain(_)) => {
            failed_submission(&state, view, StatusCode::INTERNAL_SERVER_ERROR, &err)
        }
    }
}

fn failed_submission(
    state: &HttpState,
    view: ComposerView,
    status: StatusCode,
    err: &CreatePostError,
) -> Response {
    let mut response = render_composer(
        state,
        view.with_notification(NotificationView::failed()),
        status,
    );
    ErrorReport::from_error(SOURCE, status, err).attach(&mut response);
    response
}

/// The cookie value, when it matches the configured admin key.
fn admitted_key(state: &HttpState, jar: &CookieJar) -> Option<String> {
    let candidate = jar.get(ADMIN_KEY_COOKIE)?.value();
    state
        .posts
        .gate()
        .verify(candidate)
        .then(|| candidate.to_string())
}

fn field_errors(state: &HttpState, draft: &DraftPost) -> FieldErrors {
    validate(draft, state.posts.schema()).err().unwrap_or_default()
}

fn with_content_preview(state: &HttpState, view: ComposerView, draft: &DraftPost) -> ComposerView {
    match draft.content.as_deref() {
        Some(content) if !content.trim().is_empty() => {
            view.with_preview(state.renderer.render(content))
        }
        _ => view,
    }
}

fn invalid_draft(state: &HttpState, draft: &DraftPost, errors: &FieldErrors) -> Response {
    let view = with_content_preview(state, ComposerView::new(draft, errors), draft);
    let mut response = render_composer(state, view, StatusCode::UNPROCESSABLE_ENTITY);
    ErrorReport::from_message(SOURCE, StatusCode::UNPROCESSABLE_ENTITY, errors.to_string())
        .attach(&mut response);
    response
}

fn render_composer(state: &HttpState, view: ComposerView, status: StatusCode) -> Response {
    let chrome = state.chrome.clone().with_page_title("New post");
    let view = LayoutContext::new(chrome, view);
    render_template_response(CreateTemplate { view }, status)
}
