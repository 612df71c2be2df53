// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account records transported between the client and the gym backend.

pub mod admin;
pub mod member;
pub mod profile;
pub mod trainer;

pub use admin::Admin;
pub use member::Member;
pub use profile::{AccountRecord, ProfileCompletion};
pub use trainer::Trainer;
