use std::{process, sync::Arc};

use penstroke::{
    application::{
        error::AppError,
        gate::AdminGate,
        listing::ListingService,
        posts::PostCreationService,
        reading::ReadingService,
        render::MarkdownRenderer,
        repos::{HealthRepo, PostsRepo, PostsWriteRepo},
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, HttpState, RouterState},
        telemetry,
    },
    presentation::views::LayoutChrome,
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let router_state = build_router_state(repositories, &settings);

    if settings.admin.key.is_none() {
        warn!(
            target = "penstroke::startup",
            "no admin key configured; post creation is disabled"
        );
    }

    serve_http(&settings, router_state).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_router_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> RouterState {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories;

    let renderer = Arc::new(MarkdownRenderer::new());
    let listing = Arc::new(ListingService::new(posts_repo.clone()));
    let reading = Arc::new(ReadingService::new(posts_repo.clone(), renderer.clone()));
    let posts = Arc::new(PostCreationService::new(
        posts_repo,
        posts_write_repo,
        AdminGate::new(settings.admin.key.clone()),
        settings.schema.clone(),
    ));

    RouterState {
        http: HttpState {
            listing: listing.clone(),
            reading,
            posts: posts.clone(),
            renderer,
            health: health_repo,
            chrome: LayoutChrome::new(settings.site.title.clone()),
        },
        api: ApiState { listing, posts },
    }
}

async fn serve_http(settings: &config::Settings, state: RouterState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "penstroke::startup",
        addr = %settings.server.addr,
        "listening"
    );

    let (drain_tx, drain_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = drain_rx.await;
            })
            .into_future(),
    );

    tokio::select! {
        joined = &mut server => return server_outcome(joined),
        () = shutdown_signal() => {}
    }

    info!(
        target = "penstroke::shutdown",
        grace_secs = settings.server.graceful_shutdown.as_secs(),
        "shutdown signal received; draining connections"
    );
    let _ = drain_tx.send(());

    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(joined) => server_outcome(joined),
        Err(_) => {
            warn!(
                target = "penstroke::shutdown",
                "connections still open after the grace period; exiting"
            );
            Ok(())
        }
    }
}

fn server_outcome(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(result) => result.map_err(|err| AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "penstroke::shutdown", error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(target = "penstroke::shutdown", error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
