// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential token decoding.
//!
//! The client never holds the backend's signing key, so decoding here is
//! purely structural: three dot-separated segments, the middle one a
//! base64url JSON object carrying `sub` and `role`.

use crate::error::{ClientError, Result};
use base64::{
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
    Engine as _,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Prefix Spring Security puts on role authorities.
const ROLE_PREFIX: &str = "ROLE_";

/// Account role, decoded once from the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Trainer,
    Member,
}

impl FromStr for Role {
    type Err = ClientError;

    /// Parse a role tag, stripping any `ROLE_` prefix (case-insensitive).
    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let canonical = match trimmed.get(..ROLE_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(ROLE_PREFIX) => {
                &trimmed[ROLE_PREFIX.len()..]
            }
            _ => trimmed,
        };

        match canonical.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "TRAINER" => Ok(Role::Trainer),
            "MEMBER" => Ok(Role::Member),
            _ => Err(ClientError::MalformedToken(format!("unknown role: {raw}"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "Admin",
            Role::Trainer => "Trainer",
            Role::Member => "Member",
        };
        f.write_str(name)
    }
}

/// Authenticated identity derived from the credential token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

/// Claims the client cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    pub role: Role,
    /// Set only on accounts freshly provisioned through OAuth
    pub is_new_user: bool,
    /// Expiration time (Unix timestamp), informational only
    pub exp: Option<u64>,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            username: self.sub.clone(),
            role: self.role,
        }
    }
}

/// Decode a credential token's payload without verifying its signature.
pub fn decode_token(raw: &str) -> Result<Claims> {
    let segments: Vec<&str> = raw.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(ClientError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let payload = segments[1];
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .map_err(|e| ClientError::MalformedToken(format!("payload is not base64: {e}")))?;

    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::MalformedToken(format!("payload is not JSON: {e}")))?;

    let sub = value
        .get("sub")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ClientError::MalformedToken("missing sub claim".to_string()))?
        .to_string();

    let role = value
        .get("role")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::MalformedToken("missing role claim".to_string()))?
        .parse()?;

    Ok(Claims {
        sub,
        role,
        is_new_user: new_user_marker(&value),
        exp: value.get("exp").and_then(Value::as_u64),
    })
}

/// Read the new-user marker, which backends emit as a bool or a string.
fn new_user_marker(payload: &Value) -> bool {
    ["isNewUser", "is_new_user", "newUser"]
        .iter()
        .filter_map(|key| payload.get(*key))
        .any(is_truthy)
}

/// Interpret a flag value the way the OAuth redirect does (`true`/`1`).
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => is_truthy_str(s),
        Value::Number(n) => n.as_u64() == Some(1),
        _ => false,
    }
}

pub(crate) fn is_truthy_str(s: &str) -> bool {
    s.eq_ignore_ascii_case("true") || s == "1"
}
