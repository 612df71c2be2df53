// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use gym_client::auth::{CsrfStrategy, MemoryCredentialStore, SessionManager};
use gym_client::config::Config;
use gym_client::services::ApiClient;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Key the fake backend signs tokens with. The client never verifies it.
#[allow(dead_code)]
pub const SIGNING_KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

#[allow(dead_code)]
pub const CSRF_TOKEN: &str = "csrf-from-login-page";

/// Claims the backend puts in credential tokens.
#[derive(Serialize)]
struct BackendClaims<'a> {
    sub: &'a str,
    role: &'a str,
    exp: usize,
    #[serde(rename = "isNewUser", skip_serializing_if = "Option::is_none")]
    is_new_user: Option<bool>,
}

/// Mint an HS256 credential token like the backend does.
#[allow(dead_code)]
pub fn mint_token(sub: &str, role: &str, is_new_user: Option<bool>) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = BackendClaims {
        sub,
        role,
        exp: now + 3600,
        is_new_user,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .expect("Failed to create JWT")
}

/// Config pointing at a mock backend.
#[allow(dead_code)]
pub fn test_config(server: &MockServer, strategies: Vec<CsrfStrategy>) -> Config {
    Config {
        api_url: server.uri(),
        csrf_strategies: strategies,
        csrf_settle_delay: Duration::ZERO,
        ..Config::default()
    }
}

/// API client using only the login-page CSRF strategy.
#[allow(dead_code)]
pub fn test_api(server: &MockServer) -> Arc<ApiClient> {
    Arc::new(
        ApiClient::new(&test_config(server, vec![CsrfStrategy::LoginPage]))
            .expect("Failed to build API client"),
    )
}

/// Session manager backed by an in-memory store.
#[allow(dead_code)]
pub fn test_session(server: &MockServer) -> (SessionManager, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    (SessionManager::new(test_api(server), store.clone()), store)
}

/// Login page HTML the way Spring's default form renders it.
#[allow(dead_code)]
pub fn login_page(csrf: &str) -> String {
    format!(
        r#"<html><body><form method="post" action="/login">
        <input type="text" name="username"/>
        <input type="password" name="password"/>
        <input name="_csrf" type="hidden" value="{csrf}" />
        </form></body></html>"#
    )
}

/// Mount `GET /login` serving a page with `CSRF_TOKEN`, expected `times` times.
#[allow(dead_code)]
pub async fn mount_login_page(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(login_page(CSRF_TOKEN), "text/html"))
        .expect(times)
        .mount(server)
        .await;
}
