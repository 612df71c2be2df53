// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Current-user operations built on top of the account wrappers.
//!
//! The backend has no "trainer by username" or "admin by username" lookup,
//! so resolving a trainer or admin scans the full listing. That is O(n) in
//! the number of accounts and is a known inefficiency of the API, not a bug.

use super::api::ApiClient;
use crate::auth::claims::{decode_token, Claims, Role};
use crate::error::{ClientError, Result};
use crate::models::member::UNASSIGNED_TRAINER;
use crate::models::{AccountRecord, ProfileCompletion};

impl ApiClient {
    /// Decode the claims of the credential token currently held.
    pub async fn current_claims(&self) -> Result<Claims> {
        let token = self
            .bearer_token()
            .await
            .ok_or(ClientError::NotAuthenticated)?;
        decode_token(&token)
    }

    /// Fetch the full account record behind the current identity.
    ///
    /// Returns `Ok(None)` when a trainer or admin username is missing from
    /// the listing.
    pub async fn resolve_current_record(&self) -> Result<Option<AccountRecord>> {
        let claims = self.current_claims().await?;

        let record = match claims.role {
            Role::Member => Some(AccountRecord::Member(self.get_my_profile().await?)),
            Role::Trainer => self
                .list_trainers()
                .await?
                .into_iter()
                .find(|t| t.username == claims.sub)
                .map(AccountRecord::Trainer),
            Role::Admin => self
                .list_admins()
                .await?
                .into_iter()
                .find(|a| a.username == claims.sub)
                .map(AccountRecord::Admin),
        };

        if record.is_none() {
            tracing::info!(username = %claims.sub, role = %claims.role, "No account record for current identity");
        }
        Ok(record)
    }

    /// Update the current identity's own record.
    ///
    /// Members go through `members/me`; trainers and admins are located by
    /// username and updated by ID. Returns `Ok(None)` if no such account is
    /// listed. The returned record is the backend's echo when it sends JSON,
    /// otherwise the submitted record.
    pub async fn update_current_profile(
        &self,
        record: &AccountRecord,
    ) -> Result<Option<AccountRecord>> {
        let claims = self.current_claims().await?;

        match (claims.role, record) {
            (Role::Member, AccountRecord::Member(member)) => {
                let updated = self.update_my_profile(member).await?;
                Ok(Some(AccountRecord::Member(
                    updated.json().unwrap_or_else(|| member.clone()),
                )))
            }
            (Role::Trainer, AccountRecord::Trainer(trainer)) => {
                let Some(id) = self.find_trainer_id(&claims.sub).await? else {
                    return Ok(None);
                };
                let updated = self.update_trainer(id, trainer).await?;
                Ok(Some(AccountRecord::Trainer(
                    updated.json().unwrap_or_else(|| trainer.clone()),
                )))
            }
            (Role::Admin, AccountRecord::Admin(admin)) => {
                let Some(id) = self.find_admin_id(&claims.sub).await? else {
                    return Ok(None);
                };
                let updated = self.update_admin(id, admin).await?;
                Ok(Some(AccountRecord::Admin(
                    updated.json().unwrap_or_else(|| admin.clone()),
                )))
            }
            (role, _) => Err(ClientError::Internal(anyhow::anyhow!(
                "record kind does not match current role {}",
                role
            ))),
        }
    }

    async fn find_trainer_id(&self, username: &str) -> Result<Option<i64>> {
        Ok(self
            .list_trainers()
            .await?
            .into_iter()
            .find(|t| t.username == username)
            .and_then(|t| t.id))
    }

    async fn find_admin_id(&self, username: &str) -> Result<Option<i64>> {
        Ok(self
            .list_admins()
            .await?
            .into_iter()
            .find(|a| a.username == username)
            .and_then(|a| a.id))
    }

    /// Submit profile completion for an OAuth-provisioned member.
    ///
    /// Uses `members/complete-profile` when the backend has it, otherwise
    /// falls back to read-modify-write of `members/me`.
    pub async fn complete_profile(&self, data: &ProfileCompletion) -> Result<()> {
        match self
            .post::<serde_json::Value, _>("members/complete-profile", data)
            .await
        {
            Ok(_) => return Ok(()),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Profile completion endpoint failed, falling back to members/me update"
                );
            }
        }

        let mut member = self.get_my_profile().await?;
        member.phone_number = data.phone_number.clone();
        member.gender = data.gender.clone();
        member.trainer_id = Some(data.trainer_id.unwrap_or(UNASSIGNED_TRAINER));

        self.update_my_profile(&member).await?;
        Ok(())
    }
}
