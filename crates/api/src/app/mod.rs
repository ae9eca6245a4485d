//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: persistence wiring (pool, repos, invoice service)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crewpay_store::StoreResult;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router against a fresh pool (public entrypoint used
/// by `main.rs`). Bootstraps the schema on the way.
pub async fn build_app(database_url: &str) -> StoreResult<Router> {
    let pool = crewpay_store::connect(database_url).await?;
    crewpay_store::init_schema(&pool).await?;
    Ok(build_app_with_pool(pool))
}

/// Router over an existing pool; the schema must already be in place.
pub fn build_app_with_pool(pool: sqlx::SqlitePool) -> Router {
    let services = Arc::new(services::AppServices::new(pool));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .layer(Extension(services))
}
