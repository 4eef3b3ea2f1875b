// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Beta request intake route.

use crate::error::Result;
use crate::middleware::auth::extract_session;
use crate::models::BetaRequestForm;
use crate::AppState;
use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/beta/request", post(submit_beta_request))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BetaSubmitResponse {
    success: bool,
    request_id: String,
}

/// Record a beta access request.
///
/// The session is optional: anonymous submissions are accepted and
/// keyed separately from authenticated ones.
async fn submit_beta_request(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(form): Json<BetaRequestForm>,
) -> Result<Json<BetaSubmitResponse>> {
    let profile = extract_session(&jar, &headers, &state.config.session_signing_key);

    let request_id = state
        .beta
        .submit(form, profile.as_ref().map(|p| p.uid.as_str()))
        .await?;

    Ok(Json(BetaSubmitResponse {
        success: true,
        request_id,
    }))
}
