mod core;
mod features;
mod modules;

use crate::core::config::Config;
use crate::core::middleware;
use crate::core::openapi::ApiDoc;
use crate::features::album::{routes as album_routes, AlbumService};
use crate::features::photos::{routes as photos_routes, PhotoService};
use crate::modules::sync::ImmichClient;
use axum::Router;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!("Configuration loaded successfully");

    // Initialize Immich sync client when fully configured
    let immich_client = match config.immich.sync_settings() {
        Some(settings) => {
            tracing::info!("Immich sync enabled for {}", settings.base_url);
            Some(Arc::new(ImmichClient::new(settings).map_err(|e| {
                anyhow::anyhow!("Failed to initialize Immich client: {}", e)
            })?))
        }
        None => {
            tracing::warn!(
                "Immich configuration incomplete, cloud sync disabled \
                 (required: IMMICH_BASE_URL, IMMICH_API_KEY, IMMICH_ALBUM_ID)"
            );
            None
        }
    };

    // Initialize Photo Service and its directory
    let photo_service = Arc::new(PhotoService::new(
        config.app.photos_dir.clone(),
        immich_client,
    ));
    photo_service.ensure_dir().await?;
    tracing::info!(
        "Photo service initialized (directory: {})",
        config.app.photos_dir.display()
    );

    // Initialize Album Service
    let album_service = Arc::new(AlbumService::new(config.immich.clone()));
    tracing::info!("Album service initialized");

    // Build swagger router
    let swagger = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(photos_routes::routes(
            photo_service,
            config.app.max_request_body_size,
        ))
        .merge(album_routes::routes(album_service))
        .merge(health_route)
        // Anything else is a static frontend asset (index.html at "/")
        .fallback_service(ServeDir::new(&config.app.public_dir))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
