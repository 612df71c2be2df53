// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile completion payload and the resolved "current user" record.

use super::{Admin, Member, Trainer};
use serde::{Deserialize, Serialize};

/// Optional fields submitted once by OAuth-provisioned members.
///
/// Absent fields serialize as explicit `null`, never as omitted keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCompletion {
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub trainer_id: Option<i64>,
}

impl ProfileCompletion {
    /// Payload for "skip for now": every field null.
    pub fn skip() -> Self {
        Self::default()
    }
}

/// Full account record of the current identity, tagged by role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role_kind", content = "record", rename_all = "lowercase")]
pub enum AccountRecord {
    Admin(Admin),
    Trainer(Trainer),
    Member(Member),
}

impl AccountRecord {
    pub fn username(&self) -> &str {
        match self {
            AccountRecord::Admin(a) => &a.username,
            AccountRecord::Trainer(t) => &t.username,
            AccountRecord::Member(m) => &m.username,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            AccountRecord::Admin(a) => a.id,
            AccountRecord::Trainer(t) => t.id,
            AccountRecord::Member(m) => m.id,
        }
    }
}
