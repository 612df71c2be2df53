// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth redirect handling.
//!
//! After Google sign-in the backend redirects to the client root with
//! `?token=<jwt>&isNewUser=<bool>`. Those parameters are consumed once and
//! stripped so a reload does not process them again.

use super::claims::is_truthy_str;
use reqwest::Url;

const TOKEN_PARAM: &str = "token";
const NEW_USER_PARAM: &str = "isNewUser";

/// Credential handed over by an OAuth redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthRedirect {
    pub token: String,
    pub is_new_user: bool,
}

/// Pull the OAuth parameters out of `location`, rewriting it in place.
///
/// Other query parameters survive; if none remain the query is removed.
pub fn take_oauth_redirect(location: &mut Url) -> Option<OAuthRedirect> {
    let mut token = None;
    let mut is_new_user = false;
    let mut kept = Vec::new();
    let mut consumed = false;

    for (key, value) in location.query_pairs() {
        match key.as_ref() {
            TOKEN_PARAM => {
                token = Some(value.into_owned()).filter(|t| !t.is_empty());
                consumed = true;
            }
            NEW_USER_PARAM => {
                is_new_user = is_truthy_str(&value);
                consumed = true;
            }
            _ => kept.push((key.to_string(), value.to_string())),
        }
    }

    if consumed {
        if kept.is_empty() {
            location.set_query(None);
        } else {
            location.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    token.map(|token| OAuthRedirect { token, is_new_user })
}
