use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use time::{OffsetDateTime, macros::datetime};
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use penstroke::application::gate::AdminGate;
use penstroke::application::listing::ListingService;
use penstroke::application::posts::PostCreationService;
use penstroke::application::reading::ReadingService;
use penstroke::application::render::MarkdownRenderer;
use penstroke::application::repos::{
    CreatePostParams, HealthRepo, PostsRepo, PostsWriteRepo, RepoError,
};
use penstroke::domain::entities::{PostRecord, PostSummaryRecord};
use penstroke::infra::http::{self, ApiState, HttpState, RouterState};
use penstroke::presentation::views::LayoutChrome;
use penstroke_api_types::DraftSchema;

const ADMIN_KEY: &str = "let-me-write";

#[derive(Default)]
struct InMemoryPosts {
    posts: Mutex<HashMap<String, PostRecord>>,
}

impl InMemoryPosts {
    async fn seed(&self, slug: &str, created_at: OffsetDateTime) {
        let record = PostRecord {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: format!("Title of {slug}"),
            preview: format!("Preview of {slug}"),
            content: format!("# Content of {slug}"),
            created_at,
        };
        self.posts.lock().await.insert(slug.to_string(), record);
    }
}

#[async_trait]
impl PostsRepo for InMemoryPosts {
    async fn list_post_summaries(&self) -> Result<Vec<PostSummaryRecord>, RepoError> {
        // HashMap order is arbitrary; sorting is the listing's job.
        let posts = self.posts.lock().await;
        Ok(posts.values().cloned().map(PostSummaryRecord::from).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.posts.lock().await.get(slug).cloned())
    }
}

#[async_trait]
impl PostsWriteRepo for InMemoryPosts {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut posts = self.posts.lock().await;
        if posts.contains_key(&params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "posts_slug_key".to_string(),
            });
        }
        let record = PostRecord {
            id: Uuid::new_v4(),
            slug: params.slug,
            title: params.title,
            preview: params.preview,
            content: params.content,
            created_at: OffsetDateTime::now_utc(),
        };
        posts.insert(record.slug.clone(), record.clone());
        Ok(record)
    }
}

struct StaticHealth(bool);

#[async_trait]
impl HealthRepo for StaticHealth {
    async fn health_check(&self) -> Result<(), RepoError> {
        if self.0 {
            Ok(())
        } else {
            Err(RepoError::Timeout)
        }
    }
}

/// Accepts nothing; every insert fails the way a broken connection would.
struct FailingWriter(&'static str);

#[async_trait]
impl PostsWriteRepo for FailingWriter {
    async fn create_post(&self, _params: CreatePostParams) -> Result<PostRecord, RepoError> {
        Err(RepoError::Persistence(self.0.to_string()))
    }
}

fn build_app(store: Arc<InMemoryPosts>, admin_key: Option<&str>, healthy: bool) -> Router {
    let reader: Arc<dyn PostsRepo> = store.clone();
    let writer: Arc<dyn PostsWriteRepo> = store;
    build_app_with(reader, writer, admin_key, healthy)
}

fn build_app_with(
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    admin_key: Option<&str>,
    healthy: bool,
) -> Router {
    let renderer = Arc::new(MarkdownRenderer::new());

    let listing = Arc::new(ListingService::new(reader.clone()));
    let reading = Arc::new(ReadingService::new(reader.clone(), renderer.clone()));
    let posts = Arc::new(PostCreationService::new(
        reader,
        writer,
        AdminGate::new(admin_key.map(str::to_string)),
        DraftSchema::default(),
    ));

    http::build_router(RouterState {
        http: HttpState {
            listing: listing.clone(),
            reading,
            posts: posts.clone(),
            renderer,
            health: Arc::new(StaticHealth(healthy)),
            chrome: LayoutChrome::new("test-site"),
        },
        api: ApiState { listing, posts },
    })
}

fn app(store: Arc<InMemoryPosts>) -> Router {
    build_app(store, Some(ADMIN_KEY), true)
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn post_form(cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/create")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, format!("admin_key={cookie}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn create_body(title: &str, key: &str) -> Value {
    json!({
        "title": title,
        "preview": "A short preview",
        "content": "# Heading\n\nSome *markdown*.",
        "submitterKey": key,
    })
}

#[tokio::test]
async fn listing_is_newest_first_and_omits_content() {
    let store = Arc::new(InMemoryPosts::default());
    store.seed("january", datetime!(2023-01-01 00:00:00 UTC)).await;
    store.seed("march", datetime!(2023-03-01 00:00:00 UTC)).await;
    store.seed("february", datetime!(2023-02-01 00:00:00 UTC)).await;

    let response = app(store).oneshot(get("/api/posts")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let posts = body.as_array().expect("array");
    let slugs: Vec<_> = posts
        .iter()
        .map(|post| post["slug"].as_str().expect("slug"))
        .collect();

    assert_eq!(slugs, ["march", "february", "january"]);
    assert_eq!(posts[2]["createdAt"], "Sun, 01 Jan 2023 00:00:00 GMT");
    assert!(posts.iter().all(|post| post.get("content").is_none()));
}

#[tokio::test]
async fn index_page_lists_posts_under_blog_title() {
    let store = Arc::new(InMemoryPosts::default());
    store.seed("hello", datetime!(2024-06-01 08:00:00 UTC)).await;

    let response = app(store).oneshot(get("/")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<title>Blog | test-site</title>"));
    assert!(html.contains("href=\"/hello\""));
    assert!(html.contains("Sat, 01 Jun 2024 08:00:00 GMT"));
    assert!(!html.contains("Content of hello"));
}

#[tokio::test]
async fn creation_rejects_a_wrong_key() {
    let store = Arc::new(InMemoryPosts::default());

    let response = app(store.clone())
        .oneshot(post_json("/api/post", create_body("Hello", "nope")))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "unauthorized");
    assert!(store.posts.lock().await.is_empty());
}

#[tokio::test]
async fn creation_is_disabled_without_a_configured_key() {
    let store = Arc::new(InMemoryPosts::default());

    let response = build_app(store, None, true)
        .oneshot(post_json("/api/post", create_body("Hello", "")))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn creation_reports_field_errors() {
    let store = Arc::new(InMemoryPosts::default());
    let mut body = create_body("", ADMIN_KEY);
    body["preview"] = json!("x".repeat(501));

    let response = app(store)
        .oneshot(post_json("/api/post", body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    let fields = &body["error"]["fields"];
    assert_eq!(
        fields["title"],
        json!(["String must contain at least 1 character(s)"])
    );
    assert_eq!(
        fields["preview"],
        json!(["String must contain at most 500 character(s)"])
    );
    assert!(fields.get("content").is_none());
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let store = Arc::new(InMemoryPosts::default());

    let response = app(store)
        .oneshot(post_json("/api/post", json!({ "title": 5 })))
        .await
        .expect("response");

    assert!(response.status().is_client_error());
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn duplicate_titles_get_suffixed_slugs_and_are_readable() {
    let store = Arc::new(InMemoryPosts::default());
    let app = app(store);

    let first = app
        .clone()
        .oneshot(post_json("/api/post", create_body("Hello World", ADMIN_KEY)))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await;
    assert_eq!(first["slug"], "hello-world");
    assert!(first["createdAt"].as_str().expect("date").ends_with(" GMT"));

    let second = app
        .clone()
        .oneshot(post_json("/api/post", create_body("Hello World", ADMIN_KEY)))
        .await
        .expect("response");
    assert_eq!(body_json(second).await["slug"], "hello-world-2");

    let page = app
        .oneshot(get("/hello-world-2"))
        .await
        .expect("response");
    assert_eq!(page.status(), StatusCode::OK);
    let html = body_text(page).await;
    assert!(html.contains("<title>Hello World | test-site</title>"));
    assert!(html.contains("<h1>Heading</h1>"));
    assert!(html.contains("<em>markdown</em>"));
}

#[tokio::test]
async fn titles_matching_fixed_routes_get_a_readable_slug() {
    let store = Arc::new(InMemoryPosts::default());
    let app = app(store);

    let created = app
        .clone()
        .oneshot(post_json("/api/post", create_body("Create", ADMIN_KEY)))
        .await
        .expect("response");
    assert_eq!(created.status(), StatusCode::CREATED);
    let slug = body_json(created).await["slug"]
        .as_str()
        .expect("slug")
        .to_string();
    assert_eq!(slug, "create-2");

    let page = app
        .oneshot(get(&format!("/{slug}")))
        .await
        .expect("response");
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body_text(page).await.contains("<title>Create | test-site</title>"));
}

#[tokio::test]
async fn storage_failures_do_not_leak_into_the_body() {
    let secret = "password authentication failed for user \"blog_admin\"";
    let store = Arc::new(InMemoryPosts::default());
    let app = build_app_with(store, Arc::new(FailingWriter(secret)), Some(ADMIN_KEY), true);

    let response = app
        .oneshot(post_json("/api/post", create_body("Hello", ADMIN_KEY)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(!body.contains("blog_admin"));
    assert!(!body.contains("password"));
    let body: Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(body["error"]["code"], "repo_error");
    assert_eq!(body["error"]["message"], "Persistence error");
}

#[tokio::test]
async fn unknown_slug_renders_not_found_page() {
    let store = Arc::new(InMemoryPosts::default());

    let response = app(store).oneshot(get("/missing")).await.expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page Not Found"));
}

#[tokio::test]
async fn create_page_redirects_without_a_valid_cookie() {
    let store = Arc::new(InMemoryPosts::default());
    let app = app(store);

    let missing = app.clone().oneshot(get("/create")).await.expect("response");
    assert_eq!(missing.status(), StatusCode::SEE_OTHER);
    assert_eq!(missing.headers()[header::LOCATION], "/");

    let wrong = Request::builder()
        .uri("/create")
        .header(header::COOKIE, "admin_key=guess")
        .body(Body::empty())
        .expect("request");
    let wrong = app.oneshot(wrong).await.expect("response");
    assert_eq!(wrong.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn create_page_renders_for_the_admin() {
    let store = Arc::new(InMemoryPosts::default());

    let request = Request::builder()
        .uri("/create")
        .header(header::COOKIE, format!("admin_key={ADMIN_KEY}"))
        .body(Body::empty())
        .expect("request");
    let response = app(store).oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<title>New post | test-site</title>"));
    assert!(html.contains("name=\"content\""));
    assert!(!html.contains(ADMIN_KEY));
}

#[tokio::test]
async fn form_submission_creates_and_links_to_the_post() {
    let store = Arc::new(InMemoryPosts::default());

    let response = app(store.clone())
        .oneshot(post_form(
            Some(ADMIN_KEY),
            "title=Form+Post&preview=Short&content=%23+Hi&intent=submit",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let html = body_text(response).await;
    assert!(html.contains("Post created successfully"));
    assert!(html.contains("href=\"/form-post\""));
    assert!(store.posts.lock().await.contains_key("form-post"));
}

#[tokio::test]
async fn form_preview_renders_markdown_without_creating() {
    let store = Arc::new(InMemoryPosts::default());

    let response = app(store.clone())
        .oneshot(post_form(
            Some(ADMIN_KEY),
            "title=Draft&preview=Short&content=%23+Rendered&intent=preview",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<h1>Rendered</h1>"));
    assert!(store.posts.lock().await.is_empty());
}

#[tokio::test]
async fn invalid_form_lists_each_message() {
    let store = Arc::new(InMemoryPosts::default());

    let response = app(store.clone())
        .oneshot(post_form(Some(ADMIN_KEY), "title=&preview=Short&content=Body"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("• String must contain at least 1 character(s)"));
    assert!(store.posts.lock().await.is_empty());
}

#[tokio::test]
async fn form_submission_without_cookie_redirects() {
    let store = Arc::new(InMemoryPosts::default());

    let response = app(store.clone())
        .oneshot(post_form(None, "title=T&preview=P&content=C"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(store.posts.lock().await.is_empty());
}

#[tokio::test]
async fn health_endpoint_reflects_the_database() {
    let healthy = build_app(Arc::new(InMemoryPosts::default()), None, true)
        .oneshot(get("/_health/db"))
        .await
        .expect("response");
    assert_eq!(healthy.status(), StatusCode::NO_CONTENT);

    let unhealthy = build_app(Arc::new(InMemoryPosts::default()), None, false)
        .oneshot(get("/_health/db"))
        .await
        .expect("response");
    assert_eq!(unhealthy.status(), StatusCode::SERVICE_UNAVAILABLE);
}
