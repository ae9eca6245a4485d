#[tokio::main]
async fn main() {
    crewpay_observability::init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://crewpay.db?mode=rwc".to_string());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app = match crewpay_api::app::build_app(&database_url).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("failed to open {database_url}: {e}");
            std::process::exit(1);
        }
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
