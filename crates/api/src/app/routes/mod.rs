use axum::Router;

pub mod consultants;
pub mod cycles;
pub mod invoices;
pub mod system;

/// Router for all `/api` endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/consultants", consultants::router())
        .nest("/cycles", cycles::router())
        .nest("/client-invoices", invoices::router())
}
