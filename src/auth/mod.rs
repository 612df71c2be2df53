// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication: credential tokens, CSRF, persistence and the session.

pub mod claims;
pub mod csrf;
pub mod redirect;
pub mod session;
pub mod store;

pub use claims::{decode_token, Claims, Identity, Role};
pub use csrf::CsrfStrategy;
pub use redirect::{take_oauth_redirect, OAuthRedirect};
pub use session::{SessionManager, SessionState};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
