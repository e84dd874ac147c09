mod common;

use common::{build_state, disabled_config, file_config, memory_config, page_json, post_json, user_json};
use feedline::gateway::ApiError;
use feedline::models::TokenPair;
use feedline::session::{RouteAccess, SessionPhase};
use feedline::startup::start;
use mockito::{Matcher, Server};
use serde_json::json;

#[tokio::test]
async fn test_login_browse_logout() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/accounts/token/")
        .match_body(Matcher::Json(json!({"username": "alice", "password": "pw"})))
        .with_status(200)
        .with_body(r#"{"access": "a1", "refresh": "r1"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/accounts/info/")
        .match_header("authorization", "Bearer a1")
        .with_status(200)
        .with_body(user_json(3, "alice"))
        .create_async()
        .await;
    let feed = server
        .mock("GET", "/api/post/all/")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .match_header("authorization", "Bearer a1")
        .with_status(200)
        .with_body(page_json(vec![post_json(1, "hello")]))
        .create_async()
        .await;
    let blacklist = server
        .mock("POST", "/api/accounts/api/token/blacklist/")
        .match_body(Matcher::Json(json!({"refresh": "r1"})))
        .with_status(200)
        .create_async()
        .await;

    let (state, phase) = start(memory_config(&server.url())).await.unwrap();
    assert_eq!(phase, SessionPhase::Anonymous);
    assert_eq!(state.session.guard(), RouteAccess::RedirectToLogin);

    let user = state.session.login("alice", "pw").await.unwrap();
    assert_eq!(user.followers, 3);
    assert_eq!(
        state.media.resolve(user.profile_pic.as_deref()),
        "https://media.example.com/media/profile/1.png"
    );
    assert_eq!(state.session.guard(), RouteAccess::Allowed);

    let posts = state.posts.all_posts(1).await.unwrap();
    feed.assert_async().await;
    assert_eq!(posts.results[0].content, "hello");
    assert!(state.session.is_current_user(posts.results[0].creator.id));

    state.session.logout().await;
    blacklist.assert_async().await;
    assert_eq!(state.session.phase(), SessionPhase::Anonymous);
    assert_eq!(state.tokens.load(), None);
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed_mid_session() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/accounts/info/")
        .match_header("authorization", "Bearer a1")
        .with_status(200)
        .with_body(user_json(3, "alice"))
        .create_async()
        .await;
    let rejected = server
        .mock("POST", "/api/post/9/like/")
        .match_header("authorization", "Bearer a1")
        .with_status(401)
        .with_body(r#"{"detail": "Given token not valid for any token type"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/accounts/token/refresh/")
        .match_body(Matcher::Json(json!({"refresh": "r1"})))
        .with_status(200)
        .with_body(r#"{"access": "a2"}"#)
        .expect(1)
        .create_async()
        .await;
    let retried = server
        .mock("POST", "/api/post/9/like/")
        .match_header("authorization", "Bearer a2")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let state = build_state(memory_config(&server.url()));
    state.tokens.save(&TokenPair::new("a1", Some("r1".to_string())));
    assert_eq!(state.session.initialize().await, SessionPhase::Authenticated);

    state.posts.like_post(9).await.unwrap();
    rejected.assert_async().await;
    refresh.assert_async().await;
    retried.assert_async().await;
    assert_eq!(state.tokens.access_token().as_deref(), Some("a2"));
    assert_eq!(state.tokens.refresh_token().as_deref(), Some("r1"));
    assert!(state.session.is_authenticated());
}

#[tokio::test]
async fn test_failed_refresh_signs_the_session_out() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/accounts/info/")
        .with_status(200)
        .with_body(user_json(3, "alice"))
        .create_async()
        .await;
    server
        .mock("POST", "/api/post/create/")
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("POST", "/api/accounts/token/refresh/")
        .with_status(401)
        .with_body(r#"{"detail": "Token is blacklisted"}"#)
        .create_async()
        .await;

    let state = build_state(memory_config(&server.url()));
    state.tokens.save(&TokenPair::new("a1", Some("r1".to_string())));
    state.session.initialize().await;
    let updates = state.session.subscribe();

    let draft = feedline::services::PostDraft::new("hello");
    let err = state.posts.create_post(&draft).await.unwrap_err();
    assert!(matches!(err, ApiError::AuthExpired));
    assert!(updates.has_changed().unwrap());
    assert_eq!(state.session.guard(), RouteAccess::RedirectToLogin);
    assert_eq!(state.tokens.load(), None);
}

#[tokio::test]
async fn test_startup_with_invalid_token_clears_it() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/accounts/info/")
        .with_status(401)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/accounts/token/refresh/")
        .expect(0)
        .create_async()
        .await;

    let state = build_state(memory_config(&server.url()));
    // No refresh token, so the 401 cannot be recovered
    state.tokens.save(&TokenPair::new("bogus", None));
    assert_eq!(state.session.initialize().await, SessionPhase::Anonymous);
    refresh.assert_async().await;
    assert_eq!(state.tokens.load(), None);
    assert_eq!(state.session.guard_guest(), RouteAccess::Allowed);
}

#[tokio::test]
async fn test_tokens_survive_a_restart_with_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.json");
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/accounts/token/")
        .with_status(200)
        .with_body(r#"{"access": "a1", "refresh": "r1"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/accounts/info/")
        .match_header("authorization", "Bearer a1")
        .with_status(200)
        .with_body(user_json(3, "alice"))
        .expect(2)
        .create_async()
        .await;

    let (first, _) = start(file_config(&server.url(), &path)).await.unwrap();
    first.session.login("alice", "pw").await.unwrap();
    assert!(path.exists());
    drop(first);

    let (second, phase) = start(file_config(&server.url(), &path)).await.unwrap();
    assert_eq!(phase, SessionPhase::Authenticated);
    assert_eq!(second.session.current_user().unwrap().username, "alice");
}

#[tokio::test]
async fn test_login_recovers_from_a_corrupt_token_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.json");
    std::fs::write(&path, "{broken").unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/accounts/token/")
        .with_status(200)
        .with_body(r#"{"access": "a1", "refresh": "r1"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/accounts/info/")
        .match_header("authorization", "Bearer a1")
        .with_status(200)
        .with_body(user_json(3, "alice"))
        .create_async()
        .await;

    let (state, phase) = start(file_config(&server.url(), &path)).await.unwrap();
    assert_eq!(phase, SessionPhase::Anonymous);

    state.session.login("alice", "pw").await.unwrap();
    assert!(state.session.is_authenticated());
    assert_eq!(
        state.tokens.load(),
        Some(TokenPair::new("a1", Some("r1".to_string())))
    );
}

#[tokio::test]
async fn test_disabled_storage_reads_as_logged_out() {
    let mut server = Server::new_async().await;
    let info = server
        .mock("GET", "/api/accounts/info/")
        .expect(0)
        .create_async()
        .await;

    let state = build_state(disabled_config(&server.url()));
    state.tokens.save(&TokenPair::new("a1", Some("r1".to_string())));
    assert!(!state.tokens.is_persistent());
    assert_eq!(state.tokens.load(), None);
    assert_eq!(state.session.initialize().await, SessionPhase::Anonymous);
    info.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let (state, _) = start(memory_config("http://127.0.0.1:1")).await.unwrap();
    let err = state.posts.all_posts(1).await.unwrap_err();
    assert!(matches!(err, ApiError::NetworkUnavailable));
    assert_eq!(
        err.to_string(),
        "Network error. Please check your connection."
    );
}
