//! kubemind-server - HTTP service for the kubemind incident memory pipeline.
//!
//! Observers post incidents and get back an enriched goal; reasoners post
//! resolutions, which the background consolidator turns into memories.
//!
//! # Example
//!
//! ```ignore
//! use kubemind_server::{create_server, factory};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = kubemind_core::KubeMindConfig::from_env();
//!     let settings = config.settings();
//!     let providers = factory::create_providers(&config, &settings).await?;
//!     let (state, mut runtime) = factory::assemble(&settings, providers, Default::default());
//!     runtime.start()?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, create_server(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod factory;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use factory::{assemble, create_providers, Providers};
pub use logging::init_tracing;
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}

/// Create the server requiring `Authorization: Bearer <api_key>`.
pub fn create_server_with_auth(state: AppState, api_key: impl Into<String>) -> Router {
    let api_key = middleware::ApiKey::new(api_key);
    routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn_with_state(
            api_key,
            middleware::auth_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
