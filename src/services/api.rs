// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gym backend API client.
//!
//! Single choke point for outbound HTTP. Handles:
//! - Bearer token on every request when one is held
//! - CSRF acquisition before the first mutating request
//! - The form-encoded login post beneath the JSON API
//! - Uniform error mapping (no retries; that is the caller's call)

use crate::auth::csrf::{
    extract_from_cookie_header, extract_from_html, CsrfStrategy, CSRF_FORM_FIELD, CSRF_HEADER,
};
use crate::config::Config;
use crate::error::{ClientError, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Successful API response.
///
/// Bodies are only parsed when the backend declares JSON; anything else is
/// handed back untouched.
#[derive(Debug)]
pub enum ApiResponse<T> {
    Json(T),
    Raw(reqwest::Response),
}

impl<T> ApiResponse<T> {
    /// The parsed payload, if the response was JSON.
    pub fn json(self) -> Option<T> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Raw(_) => None,
        }
    }

    /// The parsed payload, treating a non-JSON response as an error.
    pub fn into_json(self) -> Result<T> {
        match self {
            ApiResponse::Json(value) => Ok(value),
            ApiResponse::Raw(response) => Err(ClientError::Request {
                status: Some(response.status().as_u16()),
                body: format!(
                    "expected JSON response, got {}",
                    response
                        .headers()
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("no content type")
                ),
            }),
        }
    }
}

/// Login response body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Gym backend API client.
pub struct ApiClient {
    http: reqwest::Client,
    cookies: Arc<Jar>,
    base_url: Url,
    api_prefix: String,
    csrf_strategies: Vec<CsrfStrategy>,
    csrf_cookie: String,
    csrf_probe_path: String,
    csrf_settle_delay: Duration,
    /// Credential token attached as `Authorization: Bearer`.
    bearer: RwLock<Option<String>>,
    /// Cached CSRF token. The lock is held across acquisition so concurrent
    /// mutating calls share a single acquisition.
    csrf: Mutex<Option<String>>,
}

impl ApiClient {
    /// Create a client for the backend described by `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&format!("{}/", config.api_url.trim_end_matches('/')))
            .map_err(|e| {
                ClientError::Internal(anyhow::anyhow!(
                    "invalid API URL {}: {}",
                    config.api_url,
                    e
                ))
            })?;

        let cookies = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(cookies.clone())
            // Spring answers failed form logins with a redirect to the login
            // page; surface that as a failure instead of following it.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ClientError::Internal(anyhow::anyhow!("failed building HTTP client: {e}")))?;

        Ok(Self {
            http,
            cookies,
            base_url,
            api_prefix: config.api_prefix.trim_matches('/').to_string(),
            csrf_strategies: config.csrf_strategies.clone(),
            csrf_cookie: config.csrf_cookie.clone(),
            csrf_probe_path: config.csrf_probe_path.clone(),
            csrf_settle_delay: config.csrf_settle_delay,
            bearer: RwLock::new(None),
            csrf: Mutex::new(None),
        })
    }

    /// Absolute URL of a backend path (outside the JSON API prefix).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Absolute URL of a JSON API path.
    pub fn api_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if self.api_prefix.is_empty() {
            self.url(path)
        } else {
            format!("{}{}/{}", self.base_url, self.api_prefix, path)
        }
    }

    /// Where to send the user to start Google sign-in. The backend
    /// redirects back to the client root with `token` and `isNewUser`.
    pub fn google_login_url(&self) -> String {
        self.url("oauth2/authorization/google")
    }

    // ─── Credential State ────────────────────────────────────────────────────

    pub async fn set_bearer_token(&self, token: Option<String>) {
        *self.bearer.write().await = token;
    }

    pub async fn bearer_token(&self) -> Option<String> {
        self.bearer.read().await.clone()
    }

    pub async fn csrf_token(&self) -> Option<String> {
        self.csrf.lock().await.clone()
    }

    pub async fn clear_csrf_token(&self) {
        *self.csrf.lock().await = None;
    }

    // ─── CSRF Acquisition ────────────────────────────────────────────────────

    /// Return the cached CSRF token, acquiring one first if none is held.
    ///
    /// Returns `Ok(None)` when CSRF is disabled (no strategies configured).
    pub async fn ensure_csrf_token(&self) -> Result<Option<String>> {
        if self.csrf_strategies.is_empty() {
            return Ok(None);
        }

        let mut slot = self.csrf.lock().await;
        if let Some(token) = slot.as_ref() {
            return Ok(Some(token.clone()));
        }

        let token = self.acquire_csrf().await?;
        *slot = Some(token.clone());
        Ok(Some(token))
    }

    /// Discard any cached CSRF token and acquire a fresh one.
    pub async fn refresh_csrf_token(&self) -> Result<Option<String>> {
        if self.csrf_strategies.is_empty() {
            return Ok(None);
        }

        let mut slot = self.csrf.lock().await;
        *slot = None;
        let token = self.acquire_csrf().await?;
        *slot = Some(token.clone());
        Ok(Some(token))
    }

    /// Try each strategy in order; the first token found wins.
    async fn acquire_csrf(&self) -> Result<String> {
        for strategy in &self.csrf_strategies {
            match self.run_strategy(*strategy).await {
                Some(token) => {
                    tracing::debug!(strategy = strategy.name(), "CSRF token acquired");
                    return Ok(token);
                }
                None => {
                    tracing::debug!(strategy = strategy.name(), "CSRF strategy found no token");
                }
            }
        }

        let tried: Vec<&str> = self.csrf_strategies.iter().map(|s| s.name()).collect();
        tracing::warn!(strategies = ?tried, "CSRF token unavailable");
        Err(ClientError::Request {
            status: None,
            body: format!("no CSRF token from strategies: {}", tried.join(", ")),
        })
    }

    async fn run_strategy(&self, strategy: CsrfStrategy) -> Option<String> {
        match strategy {
            CsrfStrategy::LoginPage => {
                let response = self.http.get(self.url("login")).send().await.ok()?;
                if !response.status().is_success() {
                    return None;
                }
                let html = response.text().await.ok()?;
                extract_from_html(&html)
            }
            CsrfStrategy::Cookie => self.csrf_from_cookie(),
            CsrfStrategy::Probe => {
                // Status is irrelevant; the point is the Set-Cookie.
                if let Err(e) = self.http.get(self.url(&self.csrf_probe_path)).send().await {
                    tracing::debug!(error = %e, "CSRF probe request failed");
                    return None;
                }
                tokio::time::sleep(self.csrf_settle_delay).await;
                self.csrf_from_cookie()
            }
        }
    }

    fn csrf_from_cookie(&self) -> Option<String> {
        let header = self.cookies.cookies(&self.base_url)?;
        extract_from_cookie_header(header.to_str().ok()?, &self.csrf_cookie)
    }

    // ─── Requests ────────────────────────────────────────────────────────────

    /// Generic API request against a path beneath the API prefix.
    ///
    /// Mutating methods acquire a CSRF token first if none is cached.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let csrf = if is_mutating(&method) {
            self.ensure_csrf_token().await?
        } else {
            None
        };

        let url = self.api_url(path);
        tracing::debug!(method = %method, url = %url, "API request");

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = self.bearer_token().await {
            request = request.bearer_auth(token);
        }
        if let Some(token) = csrf {
            request = request.header(CSRF_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(method = %method, url = %url, error = %e, "API request failed");
            ClientError::transport(e)
        })?;

        Self::check_response(response).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<T, ()>(Method::GET, path, None)
            .await?
            .into_json()
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request::<serde_json::Value, ()>(Method::DELETE, path, None)
            .await?;
        Ok(())
    }

    /// Check response status and parse the body when it is declared JSON
    /// and non-empty.
    async fn check_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ApiResponse<T>> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "API error response");
            return Err(ClientError::Request {
                status: Some(status.as_u16()),
                body,
            });
        }

        // Spring sometimes declares JSON on an empty 200/201.
        if !is_json(&response) || response.content_length() == Some(0) {
            return Ok(ApiResponse::Raw(response));
        }

        response
            .json()
            .await
            .map(ApiResponse::Json)
            .map_err(|e| ClientError::Request {
                status: Some(status.as_u16()),
                body: format!("JSON parse error: {e}"),
            })
    }

    // ─── Login ───────────────────────────────────────────────────────────────

    /// Post credentials to the form-login endpoint.
    ///
    /// The CSRF token is refreshed first on a best-effort basis, since some
    /// backend configurations exempt `/login` from CSRF checks.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let csrf = match self.refresh_csrf_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Proceeding with login without a CSRF token");
                None
            }
        };

        let mut form = vec![("username", username), ("password", password)];
        if let Some(token) = csrf.as_deref() {
            form.push((CSRF_FORM_FIELD, token));
        }

        let mut request = self.http.post(self.url("login")).form(&form);
        if let Some(token) = csrf.as_deref() {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request.send().await.map_err(ClientError::transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), username, "Login rejected");
            return Err(ClientError::Authentication(format!(
                "login rejected with status {}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Request {
                status: Some(status.as_u16()),
                body: format!("invalid login response: {e}"),
            })
    }
}

fn is_mutating(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let mime = ct.split(';').next().unwrap_or("").trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}
