use roster_api::database::Database;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = roster_api::config::config();
    tracing::info!("Starting Roster API in {:?} mode", config.environment);

    // Apply pending migrations; the server still starts if the database is
    // down, /health will report degraded until it comes back.
    if let Err(e) = Database::migrate().await {
        tracing::warn!("migrations not applied: {}", e);
    }

    let app = roster_api::app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Roster API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
