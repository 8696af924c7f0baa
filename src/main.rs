mod core;
mod features;
mod shared;

use crate::core::config::Config;
use crate::core::database::MongoHandle;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::auth::{self, routes as auth_routes, AuthService};
use crate::features::balances::{routes as balances_routes, BalanceService};
use crate::features::categories::{routes as categories_routes, CategoryService, MongoCategoryStore};
use crate::features::files::{routes as files_routes, FileService};
use crate::features::settings::{routes as settings_routes, SettingsService};
use crate::features::tokens::{routes as tokens_routes, TokenService};
use crate::features::users::{routes as users_routes, UserService};
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
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
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Best effort: the settings routes must stay reachable when MongoDB is down
    let mongo = Arc::new(MongoHandle::open(&config.database).await);

    // Initialize auth
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        &config.auth.secret_key,
        config.auth.session_ttl,
    ));
    let auth_service = Arc::new(AuthService::new(
        config.auth.credentials_path.clone(),
        Arc::clone(&jwt_validator),
        config.auth.cookie_secure,
    ));
    tracing::info!(
        "Auth initialized (credentials: {}, session ttl: {}s)",
        config.auth.credentials_path.display(),
        config.auth.session_ttl.as_secs()
    );

    let user_service = Arc::new(UserService::new(
        Arc::clone(&mongo),
        config.database.users_collection.clone(),
    ));

    let category_store = Arc::new(MongoCategoryStore::new(
        Arc::clone(&mongo),
        config.database.categories_collection.clone(),
    ));
    let category_service = Arc::new(CategoryService::new(category_store));

    let file_service = Arc::new(FileService::new(
        Arc::clone(&mongo),
        Arc::clone(&user_service),
    ));
    let token_service = Arc::new(TokenService::new(
        Arc::clone(&mongo),
        Arc::clone(&user_service),
    ));
    let balance_service = Arc::new(BalanceService::new(
        Arc::clone(&mongo),
        Arc::clone(&user_service),
    ));
    let settings_service = Arc::new(SettingsService::new(
        Arc::clone(&mongo),
        config.database.saved_config_path.clone(),
    ));
    tracing::info!(
        "Services initialized (users: {}, categories: {})",
        config.database.users_collection,
        config.database.categories_collection
    );

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let admin_routes = Router::new()
        .merge(users_routes(user_service))
        .merge(categories_routes(category_service))
        .merge(files_routes(file_service))
        .merge(tokens_routes(token_service))
        .merge(balances_routes(balance_service))
        .merge(settings_routes(settings_service));

    // Protected routes (require a session)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes())
        .nest("/api/admin", admin_routes)
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    // Reports whether MongoDB is reachable; the process itself is up either way
    let health_mongo = Arc::clone(&mongo);
    let health_route = Router::new().route(
        "/health",
        axum::routing::get(move || {
            let mongo = Arc::clone(&health_mongo);
            async move {
                axum::Json(serde_json::json!({
                    "status": "ok",
                    "database": if mongo.is_connected().await { "connected" } else { "disconnected" },
                }))
            }
        }),
    );

    let public_routes = Router::new().merge(auth_routes::public_routes(auth_service));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
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

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    mongo.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
