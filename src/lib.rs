use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

/// Build the full application router.
pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected resources (JWT required)
        .merge(team_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn team_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::{players, teams};

    Router::new()
        // Team collection and single-team operations
        .route("/teams", post(teams::create).get(teams::list))
        .route(
            "/teams/:team_id",
            get(teams::get).put(teams::update).delete(teams::remove),
        )
        // Player sub-resources, nested under their team
        .route("/teams/:team_id/players", post(players::create))
        .route(
            "/teams/:team_id/players/:player_id",
            put(players::update).delete(players::remove),
        )
        .route_layer(axum::middleware::from_fn(middleware::jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Roster API",
        "version": version,
        "description": "REST backend for sports teams and player rosters (Axum)",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "teams": "/teams[/:teamId] (protected)",
            "players": "/teams/:teamId/players[/:playerId] (protected)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::Database::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
