//! HTTP front end.
//!
//! Route names follow the function names clients already call
//! (`/registerParkingLot`, `/addCar`, ...). Photos are served back from
//! `/blobs/*path` behind the URL signature.

pub mod handlers;
pub mod response;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{Config, ServerConfig};
use crate::error::Result;
use crate::service::ParkingService;

pub use response::{ApiError, ErrorBody};

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    /// The parking operations.
    pub service: ParkingService,
}

/// Build the application router.
pub fn router(service: ParkingService, server: &ServerConfig) -> Router {
    let state = Arc::new(AppState { service });

    let router = Router::new()
        .route("/registerParkingLot", post(handlers::register_parking_lot))
        .route("/addCar", post(handlers::add_car))
        .route("/removeCar", post(handlers::remove_car))
        .route("/getCurrentCars", get(handlers::get_current_cars))
        .route("/getCarHistory", get(handlers::get_car_history))
        .route("/blobs/*path", get(handlers::get_blob))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(server.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    let router = if server.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}

/// Serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the bind address is invalid or the listener fails.
pub async fn serve(service: ParkingService, config: &Config) -> Result<()> {
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service, &config.server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C, running until killed: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
