// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CSRF token extraction.
//!
//! Where the backend exposes its CSRF token depends on its configuration,
//! so acquisition is an ordered list of strategies where the first one to
//! yield a token wins. The network side lives in `ApiClient`; this module
//! holds the strategy type and the pure extractors.

use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

/// HTTP header the backend reads the CSRF token from.
pub const CSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Form field carrying the CSRF token on the login form-post.
pub const CSRF_FORM_FIELD: &str = "_csrf";

/// Markers the login page may embed the token in, tried in order.
static HTML_MARKERS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r#"<meta\s+name="_csrf"\s+content="([^"]+)""#).expect("valid regex"),
        Regex::new(r#"<input[^>]*name="_csrf"[^>]*value="([^"]+)""#).expect("valid regex"),
        Regex::new(r#"var\s+csrfToken\s*=\s*"([^"]+)""#).expect("valid regex"),
    ]
});

/// A single way of obtaining the CSRF token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfStrategy {
    /// GET the login page and scrape the token from its HTML.
    LoginPage,
    /// Read the CSRF cookie already held in the cookie jar.
    Cookie,
    /// Issue a throwaway GET so the backend sets a fresh cookie, wait for
    /// it to settle, then read it.
    Probe,
}

impl CsrfStrategy {
    pub fn default_order() -> Vec<CsrfStrategy> {
        vec![
            CsrfStrategy::LoginPage,
            CsrfStrategy::Cookie,
            CsrfStrategy::Probe,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CsrfStrategy::LoginPage => "login-page",
            CsrfStrategy::Cookie => "cookie",
            CsrfStrategy::Probe => "probe",
        }
    }
}

impl FromStr for CsrfStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "login-page" | "html" => Ok(CsrfStrategy::LoginPage),
            "cookie" => Ok(CsrfStrategy::Cookie),
            "probe" => Ok(CsrfStrategy::Probe),
            other => Err(format!("unknown CSRF strategy: {other}")),
        }
    }
}

/// Scrape the CSRF token from a login page.
pub fn extract_from_html(html: &str) -> Option<String> {
    HTML_MARKERS
        .iter()
        .find_map(|re| re.captures(html))
        .map(|caps| caps[1].to_string())
}

/// Pick the named cookie out of a `Cookie` header value (`a=1; b=2`).
pub fn extract_from_cookie_header(header: &str, cookie_name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}
