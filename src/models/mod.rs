// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod beta;
pub mod user;

pub use beta::{BetaRequest, BetaRequestForm, BetaRequestStatus};
pub use user::{IdentityProfile, Plan, Purchase, User};
