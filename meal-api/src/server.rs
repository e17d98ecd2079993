//! API Server setup

use axum::Router;
use meal_db::MealDatabase;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::create_router;
use crate::state::{ApiConfig, AppState};

/// Apply the HTTP middleware stack to a router
pub fn with_middleware(router: Router, enable_cors: bool) -> Router {
    let router = router.layer(TraceLayer::new_for_http());

    if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

type ServerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Build the router and bind the configured address
pub async fn bind_server(
    config: ApiConfig,
    database: Arc<MealDatabase>,
) -> ServerResult<(Router, TcpListener)> {
    let state = AppState::new(database, config.service_settings()?).await?;
    let router = with_middleware(create_router(state), config.enable_cors);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    Ok((router, listener))
}

/// Run the API server until it fails
pub async fn run_server(config: ApiConfig, database: Arc<MealDatabase>) -> ServerResult<()> {
    let (router, listener) = bind_server(config, database).await?;

    tracing::info!(addr = %listener.local_addr()?, "meal API server listening");
    axum::serve(listener, router).await?;

    Ok(())
}

/// Serve on a spawned task and return the bound address. Port 0 picks a free port.
pub async fn spawn_server(config: ApiConfig, database: Arc<MealDatabase>) -> ServerResult<SocketAddr> {
    let (router, listener) = bind_server(config, database).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "meal API server stopped");
        }
    });

    Ok(addr)
}
