// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed CRUD wrappers for admin, trainer and member accounts.

use super::api::{ApiClient, ApiResponse};
use crate::error::Result;
use crate::models::{Admin, Member, Trainer};
use serde::de::DeserializeOwned;
use serde::Serialize;

const ADMINS: &str = "admins";
const TRAINERS: &str = "trainers";
const MEMBERS: &str = "members";

impl ApiClient {
    async fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.get_json(collection).await
    }

    async fn get_by_id<T: DeserializeOwned>(&self, collection: &str, id: i64) -> Result<T> {
        self.get_json(&format!("{}/{}", collection, id)).await
    }

    async fn create<T>(&self, collection: &str, record: &T) -> Result<ApiResponse<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        self.post(collection, record).await
    }

    async fn update_by_id<T>(&self, collection: &str, id: i64, record: &T) -> Result<ApiResponse<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        self.put(&format!("{}/{}", collection, id), record).await
    }

    async fn delete_by_id(&self, collection: &str, id: i64) -> Result<()> {
        self.delete(&format!("{}/{}", collection, id)).await
    }

    // ─── Admins ──────────────────────────────────────────────────────────────

    pub async fn list_admins(&self) -> Result<Vec<Admin>> {
        self.list(ADMINS).await
    }

    pub async fn get_admin(&self, id: i64) -> Result<Admin> {
        self.get_by_id(ADMINS, id).await
    }

    pub async fn create_admin(&self, admin: &Admin) -> Result<ApiResponse<Admin>> {
        self.create(ADMINS, admin).await
    }

    pub async fn update_admin(&self, id: i64, admin: &Admin) -> Result<ApiResponse<Admin>> {
        self.update_by_id(ADMINS, id, admin).await
    }

    pub async fn delete_admin(&self, id: i64) -> Result<()> {
        self.delete_by_id(ADMINS, id).await
    }

    // ─── Trainers ────────────────────────────────────────────────────────────

    pub async fn list_trainers(&self) -> Result<Vec<Trainer>> {
        self.list(TRAINERS).await
    }

    pub async fn get_trainer(&self, id: i64) -> Result<Trainer> {
        self.get_by_id(TRAINERS, id).await
    }

    pub async fn create_trainer(&self, trainer: &Trainer) -> Result<ApiResponse<Trainer>> {
        self.create(TRAINERS, trainer).await
    }

    pub async fn update_trainer(&self, id: i64, trainer: &Trainer) -> Result<ApiResponse<Trainer>> {
        self.update_by_id(TRAINERS, id, trainer).await
    }

    pub async fn delete_trainer(&self, id: i64) -> Result<()> {
        self.delete_by_id(TRAINERS, id).await
    }

    /// Check whether a trainer ID resolves. Any failure counts as "no".
    pub async fn trainer_exists(&self, id: i64) -> bool {
        match self.get_trainer(id).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(trainer_id = id, error = %e, "Trainer lookup failed");
                false
            }
        }
    }

    // ─── Members ─────────────────────────────────────────────────────────────

    pub async fn list_members(&self) -> Result<Vec<Member>> {
        self.list(MEMBERS).await
    }

    pub async fn get_member(&self, id: i64) -> Result<Member> {
        self.get_by_id(MEMBERS, id).await
    }

    pub async fn create_member(&self, member: &Member) -> Result<ApiResponse<Member>> {
        self.create(MEMBERS, member).await
    }

    /// Update any member by ID (admin only on the backend).
    pub async fn update_member(&self, id: i64, member: &Member) -> Result<ApiResponse<Member>> {
        self.update_by_id(MEMBERS, id, member).await
    }

    pub async fn delete_member(&self, id: i64) -> Result<()> {
        self.delete_by_id(MEMBERS, id).await
    }

    pub async fn list_members_by_trainer(&self, trainer_id: i64) -> Result<Vec<Member>> {
        self.get_json(&format!("{}/by-trainer/{}", MEMBERS, trainer_id))
            .await
    }

    /// The calling member's own record.
    pub async fn get_my_profile(&self) -> Result<Member> {
        self.get_json(&format!("{}/me", MEMBERS)).await
    }

    /// Update the calling member's own record. Non-admins can only use this,
    /// not `update_member`.
    pub async fn update_my_profile(&self, member: &Member) -> Result<ApiResponse<Member>> {
        self.put(&format!("{}/me", MEMBERS), member).await
    }
}
