// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use serde::{Deserialize, Serialize};

/// Trainer account as returned by `trainers` endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    /// Backend-assigned ID (absent on create)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    /// Only sent when setting a password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Training specialty, e.g. "Strength"
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub salary: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
