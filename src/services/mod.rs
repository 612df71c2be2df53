// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - outbound access to the gym backend.

pub mod accounts;
pub mod api;
pub mod profile;

pub use api::{ApiClient, ApiResponse, LoginResponse};
