// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trainer ID the backend uses to mean "no trainer assigned".
pub const UNASSIGNED_TRAINER: i64 = 0;

/// Member account as returned by `members` endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Backend-assigned ID (absent on create)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Assigned trainer; `None` or `0` means unassigned
    #[serde(default, rename = "trainerid")]
    pub trainer_id: Option<i64>,
    pub username: String,
    /// Only sent when setting a password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Member {
    /// The assigned trainer, treating the zero sentinel as unassigned.
    pub fn assigned_trainer(&self) -> Option<i64> {
        self.trainer_id.filter(|&id| id != UNASSIGNED_TRAINER)
    }
}
