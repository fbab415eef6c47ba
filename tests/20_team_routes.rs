use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use roster_api::auth::{self, Claims};

const TEST_SECRET: &str = "test-secret";

fn init() {
    static INIT: std::sync::Once = std::sync::Once::new();
    // Must run before the config singleton is first touched
    INIT.call_once(|| std::env::set_var("JWT_SECRET", TEST_SECRET));
}

fn bearer(user_id: Uuid) -> String {
    let token = auth::generate_jwt(&Claims::new(user_id, "alice".to_string()))
        .expect("token generation");
    format!("Bearer {}", token)
}

async fn send(request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = roster_api::app().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn every_team_route_requires_a_token() -> Result<()> {
    init();
    let team_id = Uuid::new_v4();
    let player_id = Uuid::new_v4();
    let routes = [
        (Method::POST, "/teams".to_string()),
        (Method::GET, "/teams".to_string()),
        (Method::GET, format!("/teams/{}", team_id)),
        (Method::PUT, format!("/teams/{}", team_id)),
        (Method::DELETE, format!("/teams/{}", team_id)),
        (Method::POST, format!("/teams/{}/players", team_id)),
        (Method::PUT, format!("/teams/{}/players/{}", team_id, player_id)),
        (Method::DELETE, format!("/teams/{}/players/{}", team_id, player_id)),
    ];

    for (method, uri) in routes {
        let request = Request::builder()
            .method(method.clone())
            .uri(&uri)
            .body(Body::empty())?;

        // The gate rejects before any body parsing or ownership check runs
        let (status, body) = send(request).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["message"], "No token provided.", "{} {}", method, uri);
    }
    Ok(())
}

#[tokio::test]
async fn create_team_requires_all_fields() -> Result<()> {
    init();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/teams")
        .header(header::AUTHORIZATION, bearer(Uuid::new_v4()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "name": "Eagles", "city": "X" }).to_string(),
        ))?;

    let (status, body) = send(request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "All fields (name, city, stadium, sport) are required."
    );
    Ok(())
}

#[tokio::test]
async fn create_team_rejects_empty_fields() -> Result<()> {
    init();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/teams")
        .header(header::AUTHORIZATION, bearer(Uuid::new_v4()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "name": "Eagles", "city": "", "stadium": "Y", "sport": "Football" })
                .to_string(),
        ))?;

    let (status, body) = send(request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "All fields (name, city, stadium, sport) are required."
    );
    Ok(())
}

#[tokio::test]
async fn create_team_rejects_unknown_sport() -> Result<()> {
    init();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/teams")
        .header(header::AUTHORIZATION, bearer(Uuid::new_v4()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "name": "Eagles", "city": "X", "stadium": "Y", "sport": "Cricket" })
                .to_string(),
        ))?;

    let (status, body) = send(request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Sport must be one of: Baseball, Football, Basketball, Hockey, Soccer."
    );
    Ok(())
}

#[tokio::test]
async fn root_descriptor_is_public() -> Result<()> {
    init();
    let request = Request::builder().uri("/").body(Body::empty())?;
    let (status, body) = send(request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Roster API");
    Ok(())
}
