// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::User;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use std::sync::Arc;

/// API routes (require authentication via session token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me))
}

/// Get the current user's account record, creating it on first
/// sign-in. The frontend calls this on every session change, which
/// doubles as the login sync (refreshes `lastLoginAt` only).
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>> {
    let record = state.ledger.fetch_or_create(&user.profile).await?;
    Ok(Json(record))
}
