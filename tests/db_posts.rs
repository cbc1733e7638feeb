//! Repository tests against a real Postgres. Run with `DATABASE_URL` set and
//! `cargo test -- --ignored`.

use std::collections::HashSet;

use sqlx::PgPool;

use penstroke::application::repos::{
    CreatePostParams, HealthRepo, PostsRepo, PostsWriteRepo, RepoError,
};
use penstroke::infra::db::PostgresRepositories;

fn params(slug: &str) -> CreatePostParams {
    CreatePostParams {
        slug: slug.to_string(),
        title: format!("Title {slug}"),
        preview: format!("Preview {slug}"),
        content: format!("Content {slug}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn created_posts_are_found_by_slug(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);

    let created = repos.create_post(params("first")).await.expect("insert");
    let found = repos
        .find_by_slug("first")
        .await
        .expect("query")
        .expect("post exists");

    assert_eq!(found, created);
    assert!(repos.find_by_slug("absent").await.expect("query").is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_slugs_are_rejected(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);

    repos.create_post(params("same")).await.expect("first insert");
    let err = repos
        .create_post(params("same"))
        .await
        .expect_err("duplicate slug");

    assert!(matches!(
        err,
        RepoError::Duplicate { constraint } if constraint == "posts_slug_key"
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn summaries_are_newest_first(pool: PgPool) {
    for (slug, at) in [
        ("january", "2023-01-01T00:00:00Z"),
        ("march", "2023-03-01T00:00:00Z"),
        ("february", "2023-02-01T00:00:00Z"),
    ] {
        sqlx::query(
            "INSERT INTO posts (id, slug, title, preview, content, created_at) \
             VALUES (gen_random_uuid(), $1, $1, $1, $1, $2::timestamptz)",
        )
        .bind(slug)
        .bind(at)
        .execute(&pool)
        .await
        .expect("seed");
    }

    let repos = PostgresRepositories::new(pool);
    let slugs: Vec<_> = repos
        .list_post_summaries()
        .await
        .expect("list")
        .into_iter()
        .map(|post| post.slug)
        .collect();

    assert_eq!(slugs, ["march", "february", "january"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn posts_table_is_indexed_for_listing(pool: PgPool) {
    let rows: Vec<String> = sqlx::query_scalar(
        "SELECT indexname FROM pg_indexes WHERE schemaname = 'public' AND tablename = 'posts'",
    )
    .fetch_all(&pool)
    .await
    .expect("fetch post indexes");

    let indexes: HashSet<String> = rows.into_iter().collect();
    assert!(indexes.contains("posts_created_at_idx"));
    assert!(indexes.contains("posts_slug_key"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn health_check_succeeds(pool: PgPool) {
    PostgresRepositories::new(pool)
        .health_check()
        .await
        .expect("database answers");
}
