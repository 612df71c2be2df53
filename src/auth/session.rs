// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle.
//!
//! `SessionManager` is the single source of truth for who is signed in.
//! It is an explicit object handed to whatever needs it rather than a
//! global; it owns the persisted credential token and keeps the API
//! client's bearer token in step with it.
//!
//! States:
//! - `Unauthenticated`: no usable credential token
//! - `Authenticated`: token held, identity derived
//! - `PendingProfile`: authenticated OAuth newcomer who still has to
//!   complete (or skip) profile completion

use super::claims::{decode_token, Identity, Role};
use super::redirect::take_oauth_redirect;
use super::store::CredentialStore;
use crate::error::{ClientError, Result};
use crate::models::ProfileCompletion;
use crate::services::ApiClient;
use reqwest::Url;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Identity),
    PendingProfile(Identity),
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Unauthenticated => None,
            SessionState::Authenticated(identity) | SessionState::PendingProfile(identity) => {
                Some(identity)
            }
        }
    }
}

/// Owns the authentication lifecycle for one running client.
pub struct SessionManager {
    api: Arc<ApiClient>,
    store: Arc<dyn CredentialStore>,
    state: SessionState,
}

impl SessionManager {
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            api,
            store,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.state.identity()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    pub fn needs_profile_completion(&self) -> bool {
        matches!(self.state, SessionState::PendingProfile(_))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn is_trainer(&self) -> bool {
        self.has_role(Role::Trainer)
    }

    pub fn is_member(&self) -> bool {
        self.has_role(Role::Member)
    }

    fn has_role(&self, role: Role) -> bool {
        self.identity().is_some_and(|identity| identity.role == role)
    }

    /// Restore the session at startup.
    ///
    /// An OAuth redirect in `location` (`?token=..&isNewUser=..`) takes
    /// precedence over the persisted token; its parameters are stripped from
    /// `location` either way. A malformed or unreadable token is discarded.
    /// Never fails: the worst outcome is `Unauthenticated`.
    pub async fn initialize(&mut self, location: Option<&mut Url>) -> &SessionState {
        if let Some(redirect) = location.and_then(take_oauth_redirect) {
            match self.adopt_token(&redirect.token, redirect.is_new_user) {
                Ok(identity) => {
                    if let Err(e) = self.store.save(&redirect.token) {
                        tracing::warn!(error = %e, "Failed to persist OAuth credential token");
                    }
                    self.api.set_bearer_token(Some(redirect.token)).await;
                    tracing::info!(
                        username = %identity.username,
                        role = %identity.role,
                        new_user = redirect.is_new_user,
                        "Signed in from OAuth redirect"
                    );
                    return &self.state;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring malformed token from OAuth redirect");
                }
            }
        }

        let persisted = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Credential store unreadable, discarding");
                self.discard_persisted();
                None
            }
        };

        match persisted {
            Some(token) => match self.adopt_token(&token, false) {
                Ok(identity) => {
                    self.api.set_bearer_token(Some(token)).await;
                    tracing::info!(
                        username = %identity.username,
                        role = %identity.role,
                        "Restored session from persisted token"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding malformed persisted token");
                    self.discard_persisted();
                    self.reset().await;
                }
            },
            None => self.reset().await,
        }

        &self.state
    }

    /// Sign in with username and password.
    ///
    /// On any failure the session is left exactly as it was.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Identity> {
        let response = self.api.login(username, password).await?;
        let token = response.access_token;

        let claims = decode_token(&token)?;
        self.store.save(&token)?;
        self.api.set_bearer_token(Some(token)).await;

        let identity = claims.identity();
        self.state = if claims.is_new_user {
            SessionState::PendingProfile(identity.clone())
        } else {
            SessionState::Authenticated(identity.clone())
        };

        tracing::info!(username = %identity.username, role = %identity.role, "Logged in");
        Ok(identity)
    }

    /// Submit (or skip, with all fields `None`) profile completion.
    ///
    /// Only valid while `PendingProfile`. On failure the state is unchanged
    /// so the user can retry.
    pub async fn complete_profile(&mut self, data: &ProfileCompletion) -> Result<()> {
        let identity = match &self.state {
            SessionState::PendingProfile(identity) => identity.clone(),
            _ => {
                return Err(ClientError::ProfileCompletion(
                    "no profile completion pending".to_string(),
                ))
            }
        };

        self.api.complete_profile(data).await.map_err(|e| {
            tracing::warn!(username = %identity.username, error = %e, "Profile completion failed");
            ClientError::ProfileCompletion(e.to_string())
        })?;

        tracing::info!(username = %identity.username, "Profile completed");
        self.state = SessionState::Authenticated(identity);
        Ok(())
    }

    /// Drop the credential token, whatever the current state.
    pub async fn logout(&mut self) {
        if let Some(identity) = self.identity() {
            tracing::info!(username = %identity.username, "Logging out");
        }
        self.discard_persisted();
        self.reset().await;
    }

    /// Decode `token` and move to the matching authenticated state.
    fn adopt_token(&mut self, token: &str, new_user_hint: bool) -> Result<Identity> {
        let claims = decode_token(token)?;
        let identity = claims.identity();
        self.state = if claims.is_new_user || new_user_hint {
            SessionState::PendingProfile(identity.clone())
        } else {
            SessionState::Authenticated(identity.clone())
        };
        Ok(identity)
    }

    fn discard_persisted(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear persisted credential token");
        }
    }

    async fn reset(&mut self) {
        self.state = SessionState::Unauthenticated;
        self.api.set_bearer_token(None).await;
        self.api.clear_csrf_token().await;
    }
}
