// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gym management client.
//!
//! This crate provides the session and API layer for the gym management
//! backend: login (password or Google OAuth redirect), CSRF handling for
//! the cookie-protected endpoints, and typed access to admin, trainer and
//! member accounts.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use auth::{Identity, Role, SessionManager, SessionState};
pub use error::{ClientError, Result};
pub use services::ApiClient;
