// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle tests against a mock backend.
//!
//! These cover password login, OAuth hand-off, profile completion and
//! logout, checking both the in-memory state and the persisted store.

use gym_client::auth::{CredentialStore, FileCredentialStore, SessionManager, SessionState};
use gym_client::error::ClientError;
use gym_client::models::ProfileCompletion;
use gym_client::{Identity, Role};
use reqwest::Url;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{mint_token, mount_login_page, test_api, test_session, CSRF_TOKEN};

async fn mount_login_success(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("username=trainer1"))
        .and(body_string_contains("password=pw"))
        .and(body_string_contains(format!("_csrf={}", CSRF_TOKEN)))
        .and(header("X-XSRF-TOKEN", CSRF_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": token,
            "expires_in": 3600
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_derives_identity() {
    let server = MockServer::start().await;
    let token = mint_token("trainer1", "ROLE_TRAINER", None);
    mount_login_page(&server, 1).await;
    mount_login_success(&server, &token).await;

    let (mut session, store) = test_session(&server);
    session.initialize(None).await;

    let identity = session.login("trainer1", "pw").await.unwrap();

    assert_eq!(
        identity,
        Identity {
            username: "trainer1".to_string(),
            role: Role::Trainer
        }
    );
    assert_eq!(identity.role.to_string(), "Trainer");
    assert_eq!(session.state(), &SessionState::Authenticated(identity));
    assert!(session.is_trainer());
    assert_eq!(store.load().unwrap(), Some(token.clone()));
    assert_eq!(session.api().bearer_token().await, Some(token));
}

#[tokio::test]
async fn test_login_rejected_leaves_state_unchanged() {
    let server = MockServer::start().await;
    mount_login_page(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (mut session, store) = test_session(&server);
    session.initialize(None).await;

    let err = session.login("trainer1", "wrong").await.unwrap_err();

    assert!(matches!(err, ClientError::Authentication(_)), "got {err:?}");
    assert_eq!(session.state(), &SessionState::Unauthenticated);
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn test_login_redirect_to_error_page_is_rejection() {
    let server = MockServer::start().await;
    mount_login_page(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/login?error"))
        .mount(&server)
        .await;

    let (mut session, _store) = test_session(&server);
    let err = session.login("trainer1", "wrong").await.unwrap_err();

    assert!(matches!(err, ClientError::Authentication(_)), "got {err:?}");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_login_with_malformed_token_is_not_persisted() {
    let server = MockServer::start().await;
    mount_login_page(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "not-a-jwt" })),
        )
        .mount(&server)
        .await;

    let (mut session, store) = test_session(&server);
    let err = session.login("trainer1", "pw").await.unwrap_err();

    assert!(matches!(err, ClientError::MalformedToken(_)), "got {err:?}");
    assert_eq!(session.state(), &SessionState::Unauthenticated);
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn test_login_then_logout_restores_empty_store() {
    let server = MockServer::start().await;
    let token = mint_token("trainer1", "ROLE_TRAINER", None);
    mount_login_page(&server, 1).await;
    mount_login_success(&server, &token).await;

    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("storage.json");
    let store = Arc::new(FileCredentialStore::new(&store_path));
    let mut session = SessionManager::new(test_api(&server), store.clone());

    session.initialize(None).await;
    assert!(!store_path.exists());

    session.login("trainer1", "pw").await.unwrap();
    assert_eq!(store.load().unwrap(), Some(token));

    session.logout().await;
    assert_eq!(session.state(), &SessionState::Unauthenticated);
    assert_eq!(store.load().unwrap(), None);
    assert!(!store_path.exists());
    assert_eq!(session.api().csrf_token().await, None);
}

#[tokio::test]
async fn test_persisted_session_survives_restart() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("storage.json");

    let token = mint_token("member7", "ROLE_MEMBER", None);
    FileCredentialStore::new(&store_path).save(&token).unwrap();

    let mut session =
        SessionManager::new(test_api(&server), Arc::new(FileCredentialStore::new(&store_path)));
    let state = session.initialize(None).await.clone();

    assert_eq!(
        state,
        SessionState::Authenticated(Identity {
            username: "member7".to_string(),
            role: Role::Member
        })
    );
}

#[tokio::test]
async fn test_initialize_roles_from_tokens() {
    let server = MockServer::start().await;
    for (raw_role, role) in [
        ("ROLE_ADMIN", Role::Admin),
        ("ROLE_TRAINER", Role::Trainer),
        ("ROLE_MEMBER", Role::Member),
    ] {
        let (mut session, store) = test_session(&server);
        store.save(&mint_token("someone", raw_role, None)).unwrap();

        session.initialize(None).await;

        assert_eq!(session.identity().map(|i| i.role), Some(role));
        assert!(!session.needs_profile_completion());
    }
}

#[tokio::test]
async fn test_initialize_new_user_marker_in_token() {
    let server = MockServer::start().await;
    let (mut session, store) = test_session(&server);
    store
        .save(&mint_token("googler", "ROLE_MEMBER", Some(true)))
        .unwrap();

    session.initialize(None).await;

    assert!(session.needs_profile_completion());
    assert!(session.is_member());
}

#[tokio::test]
async fn test_oauth_redirect_new_user() {
    let server = MockServer::start().await;
    let token = mint_token("googler", "ROLE_MEMBER", None);
    let (mut session, store) = test_session(&server);

    let mut location =
        Url::parse(&format!("http://localhost:3000/?token={token}&isNewUser=true")).unwrap();
    let state = session.initialize(Some(&mut location)).await.clone();

    assert!(matches!(state, SessionState::PendingProfile(_)));
    assert_eq!(location.as_str(), "http://localhost:3000/");
    assert_eq!(store.load().unwrap(), Some(token));
}

async fn pending_session(server: &MockServer) -> SessionManager {
    let (mut session, store) = test_session(server);
    store
        .save(&mint_token("googler", "ROLE_MEMBER", Some(true)))
        .unwrap();
    session.initialize(None).await;
    assert!(session.needs_profile_completion());
    session
}

#[tokio::test]
async fn test_skip_profile_completion() {
    let server = MockServer::start().await;
    mount_login_page(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/members/complete-profile"))
        .and(body_json(json!({
            "phoneNumber": null,
            "gender": null,
            "trainerId": null
        })))
        .and(header("X-XSRF-TOKEN", CSRF_TOKEN))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = pending_session(&server).await;
    session
        .complete_profile(&ProfileCompletion::skip())
        .await
        .unwrap();

    assert_eq!(
        session.state(),
        &SessionState::Authenticated(Identity {
            username: "googler".to_string(),
            role: Role::Member
        })
    );
}

#[tokio::test]
async fn test_profile_completion_falls_back_to_self_update() {
    let server = MockServer::start().await;
    mount_login_page(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/members/complete-profile"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/members/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "trainerid": null,
            "username": "googler",
            "phoneNumber": null,
            "gender": null,
            "joinDate": "2025-06-01",
            "role": "MEMBER"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/members/me"))
        .and(body_json(json!({
            "id": 12,
            "trainerid": 0,
            "username": "googler",
            "phoneNumber": "555-0123",
            "gender": "Other",
            "joinDate": "2025-06-01",
            "role": "MEMBER"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = pending_session(&server).await;
    session
        .complete_profile(&ProfileCompletion {
            phone_number: Some("555-0123".to_string()),
            gender: Some("Other".to_string()),
            trainer_id: None,
        })
        .await
        .unwrap();

    assert!(!session.needs_profile_completion());
    assert!(session.is_member());
}

#[tokio::test]
async fn test_profile_completion_failure_allows_retry() {
    let server = MockServer::start().await;
    mount_login_page(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/members/complete-profile"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/members/me"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut session = pending_session(&server).await;
    let err = session
        .complete_profile(&ProfileCompletion::skip())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::ProfileCompletion(_)), "got {err:?}");
    assert!(session.needs_profile_completion());
}

#[tokio::test]
async fn test_login_without_csrf_marker_still_posts_form() {
    let server = MockServer::start().await;
    let token = mint_token("trainer1", "ROLE_TRAINER", None);
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>Please sign in</body></html>", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("username=trainer1"))
        .and(|req: &wiremock::Request| {
            !req.headers.contains_key("X-XSRF-TOKEN")
                && !String::from_utf8_lossy(&req.body).contains("_csrf")
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (mut session, _store) = test_session(&server);
    let identity = session.login("trainer1", "pw").await.unwrap();

    assert_eq!(identity.username, "trainer1");
    assert!(session.is_trainer());
    assert_eq!(session.api().csrf_token().await, None);
}

#[tokio::test]
async fn test_new_user_flag_needs_redirect_in_later_process() {
    let server = MockServer::start().await;
    mount_login_page(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/members/complete-profile"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("storage.json");
    let token = mint_token("googler", "ROLE_MEMBER", None);
    let redirect = format!("http://localhost:3000/?token={token}&isNewUser=true");

    // First invocation: the OAuth hand-off.
    let mut first =
        SessionManager::new(test_api(&server), Arc::new(FileCredentialStore::new(&store_path)));
    first
        .initialize(Some(&mut Url::parse(&redirect).unwrap()))
        .await;
    assert!(first.needs_profile_completion());

    // A later invocation without the redirect only sees the stored token.
    let mut second =
        SessionManager::new(test_api(&server), Arc::new(FileCredentialStore::new(&store_path)));
    second.initialize(None).await;
    assert!(second.is_member());
    assert!(!second.needs_profile_completion());

    // Replaying the redirect restores the pending state so completion works.
    let mut third =
        SessionManager::new(test_api(&server), Arc::new(FileCredentialStore::new(&store_path)));
    third
        .initialize(Some(&mut Url::parse(&redirect).unwrap()))
        .await;
    assert!(third.needs_profile_completion());

    third
        .complete_profile(&ProfileCompletion::skip())
        .await
        .unwrap();
    assert!(!third.needs_profile_completion());
    assert_eq!(
        FileCredentialStore::new(&store_path).load().unwrap(),
        Some(token)
    );
}
