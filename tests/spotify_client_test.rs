mod common;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Extension, Form, Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use common::{spawn_mock, spotify_config};
use serde_json::{Value, json};
use tunetrail::{
    Error,
    spotify::{OAuthClient, SpotifyClient, TopArtistsProvider},
};

type Captured = Arc<Mutex<Option<HashMap<String, String>>>>;

fn top_artists_body() -> Value {
    json!({
        "items": [
            {"id": "a1", "name": "First", "popularity": 10, "followers": {"total": 5}, "genres": ["rock"]},
            {"id": "a2", "name": "Second", "popularity": 90, "followers": {"href": null, "total": 7}},
        ],
        "total": 2,
        "limit": 20
    })
}

async fn client_for(app: Router) -> SpotifyClient {
    let base = spawn_mock(app).await;
    SpotifyClient::new(&spotify_config(&base), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_top_artists_keep_response_order() {
    let captured: Captured = Arc::new(Mutex::new(None));
    let app = Router::new()
        .route(
            "/v1/me/top/artists",
            get(
                |headers: HeaderMap,
                 Query(params): Query<HashMap<String, String>>,
                 Extension(captured): Extension<Captured>| async move {
                    if headers.get("authorization").and_then(|v| v.to_str().ok())
                        != Some("Bearer tok")
                    {
                        return (StatusCode::UNAUTHORIZED, Json(json!({})));
                    }
                    *captured.lock().unwrap() = Some(params);
                    (StatusCode::OK, Json(top_artists_body()))
                },
            ),
        )
        .layer(Extension(Arc::clone(&captured)));
    let client = client_for(app).await;

    let artists = client.fetch_top_artists("tok").await.unwrap();

    let ids: Vec<&str> = artists.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "a2"]);
    assert_eq!(artists[0].followers.total, 5);
    assert_eq!(artists[0].genres, vec!["rock".to_string()]);
    assert!(artists[1].genres.is_empty());

    let params = captured.lock().unwrap().clone().unwrap();
    assert_eq!(params.get("limit").map(String::as_str), Some("20"));
    assert_eq!(params.get("time_range").map(String::as_str), Some("medium_term"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth() {
    let app = Router::new().route(
        "/v1/me/top/artists",
        get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"error": "expired"}))) }),
    );
    let client = client_for(app).await;

    let err = client.fetch_top_artists("tok").await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn test_forbidden_maps_to_auth() {
    let app = Router::new().route(
        "/v1/me/top/artists",
        get(|| async { StatusCode::FORBIDDEN }),
    );
    let client = client_for(app).await;

    let err = client.fetch_top_artists("tok").await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn test_server_error_maps_to_network() {
    let app = Router::new().route(
        "/v1/me/top/artists",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = client_for(app).await;

    let err = client.fetch_top_artists("tok").await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
}

#[tokio::test]
async fn test_bad_body_maps_to_parse() {
    let app = Router::new().route(
        "/v1/me/top/artists",
        get(|| async { Json(json!({"artists": "nope"})) }),
    );
    let client = client_for(app).await;

    let err = client.fetch_top_artists("tok").await.unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn test_timeout_maps_to_network() {
    let app = Router::new().route(
        "/v1/me/top/artists",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(top_artists_body())
        }),
    );
    let base = spawn_mock(app).await;
    let client = SpotifyClient::new(&spotify_config(&base), Duration::from_millis(200)).unwrap();

    let err = client.fetch_top_artists("tok").await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
}

#[tokio::test]
async fn test_unreachable_host_maps_to_network() {
    // bind and drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = SpotifyClient::new(&spotify_config(&base), Duration::from_secs(1)).unwrap();
    let err = client.fetch_top_artists("tok").await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
}

#[tokio::test]
async fn test_current_user() {
    let app = Router::new().route(
        "/v1/me",
        get(|| async { Json(json!({"id": "u1", "display_name": "Listener", "country": "DE"})) }),
    );
    let client = client_for(app).await;

    let profile = client.current_user("tok").await.unwrap();
    assert_eq!(profile.id, "u1");
    assert_eq!(profile.display_name.as_deref(), Some("Listener"));
}

#[tokio::test]
async fn test_exchange_code_sends_verifier() {
    let captured: Captured = Arc::new(Mutex::new(None));
    let app = Router::new()
        .route(
            "/api/token",
            post(
                |Extension(captured): Extension<Captured>,
                 Form(form): Form<HashMap<String, String>>| async move {
                    *captured.lock().unwrap() = Some(form);
                    Json(json!({
                        "access_token": "access",
                        "token_type": "Bearer",
                        "scope": "user-top-read",
                        "expires_in": 3600,
                        "refresh_token": "refresh"
                    }))
                },
            ),
        )
        .layer(Extension(Arc::clone(&captured)));
    let base = spawn_mock(app).await;
    let oauth = OAuthClient::new(&spotify_config(&base), Duration::from_secs(2)).unwrap();

    let token = oauth.exchange_code_pkce("the-code", "the-verifier").await.unwrap();

    assert_eq!(token.access_token, "access");
    assert_eq!(token.refresh_token.as_deref(), Some("refresh"));
    assert_eq!(token.expires_in, 3600);

    let form = captured.lock().unwrap().clone().unwrap();
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["code"], "the-code");
    assert_eq!(form["code_verifier"], "the-verifier");
    assert_eq!(form["client_id"], "client-id");
    assert!(!form.contains_key("client_secret"));
}

#[tokio::test]
async fn test_refresh_keeps_refresh_token_when_not_rotated() {
    let app = Router::new().route(
        "/api/token",
        post(|| async {
            Json(json!({"access_token": "new-access", "expires_in": 3600}))
        }),
    );
    let base = spawn_mock(app).await;
    let oauth = OAuthClient::new(&spotify_config(&base), Duration::from_secs(2)).unwrap();

    let token = oauth.refresh_token("old-refresh").await.unwrap();

    assert_eq!(token.access_token, "new-access");
    assert_eq!(token.refresh_token.as_deref(), Some("old-refresh"));
}

#[tokio::test]
async fn test_rejected_code_maps_to_auth() {
    let app = Router::new().route(
        "/api/token",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "invalid_grant"})),
            )
        }),
    );
    let base = spawn_mock(app).await;
    let oauth = OAuthClient::new(&spotify_config(&base), Duration::from_secs(2)).unwrap();

    let err = oauth.exchange_code_pkce("bad", "verifier").await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[test]
fn test_authorize_url_carries_pkce_parameters() {
    let oauth =
        OAuthClient::new(&spotify_config("https://accounts.example"), Duration::from_secs(2))
            .unwrap();

    let (login, url) = oauth.begin_login().unwrap();
    let url = reqwest::Url::parse(&url).unwrap();
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    assert_eq!(url.path(), "/authorize");
    assert_eq!(params["client_id"], "client-id");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["code_challenge_method"], "S256");
    assert_eq!(params["redirect_uri"], "http://127.0.0.1:8080/callback");
    assert_eq!(params["scope"], "user-top-read user-read-private");
    assert_eq!(params["state"], login.state);
    assert_eq!(
        params["code_challenge"],
        tunetrail::utils::generate_code_challenge(&login.code_verifier)
    );
}
