// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CLI device-authorization routes.
//!
//! The CLI opens `/auth/cli?callback=<local listener URL>` in a
//! browser. Signed-out visitors are bounced to the login page with
//! the full authorization URL as the `redirect` parameter; signed-in
//! visitors get the consent context, then approve or deny.

use axum::{
    extract::{OriginalUri, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::extract_session;
use crate::models::Plan;
use crate::services::{DeviceAuthFlow, SessionState};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/cli", get(cli_auth_entry))
        .route("/auth/cli/approve", get(cli_auth_approve))
        .route("/auth/cli/deny", get(cli_auth_deny))
}

/// Query parameters for the device-authorization flow.
#[derive(Deserialize)]
pub struct CliAuthParams {
    /// The CLI's local listener URL
    #[serde(default)]
    callback: Option<String>,
}

/// Consent context rendered by the frontend before approval.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentResponse {
    pub display_name: String,
    pub email: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub credits: u32,
    pub plan: Plan,
    pub plan_label: &'static str,
    pub callback: Option<String>,
}

/// Reconstruct the full request URL. The scheme is inferred from the
/// host since the proxy in front of Cloud Run does not preserve it.
fn request_url(headers: &HeaderMap, uri: &axum::http::Uri) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8080");

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}{}", scheme, host, uri)
}

/// Entry point: settle the session, then either bounce to login or
/// hand the consent context to the frontend.
async fn cli_auth_entry(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<CliAuthParams>,
) -> Result<Response> {
    let mut flow = DeviceAuthFlow::new(params.callback);

    let Some(profile) = extract_session(&jar, &headers, &state.config.session_signing_key)
    else {
        flow.observe_session(&SessionState::SignedOut);
        let current_url = request_url(&headers, &uri);
        let login_url = flow
            .login_redirect(&current_url, &state.config.frontend_url)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("login redirect unavailable")))?;

        tracing::debug!("Unauthenticated CLI authorization, redirecting to login");
        return Ok(Redirect::temporary(&login_url).into_response());
    };

    let user = state.ledger.fetch_or_create(&profile).await?;
    flow.observe_session(&SessionState::SignedIn(Box::new(user.clone())));

    Ok(Json(ConsentResponse {
        display_name: user.display_name,
        email: user.email,
        photo_url: user.photo_url,
        credits: user.credits,
        plan: user.plan,
        plan_label: user.plan.label(),
        callback: flow.callback().map(str::to_string),
    })
    .into_response())
}

/// Approve: snapshot the current record into an authorization bundle
/// and redirect the browser to the CLI's callback. One-shot.
async fn cli_auth_approve(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    Query(params): Query<CliAuthParams>,
) -> Result<Redirect> {
    let profile = extract_session(&jar, &headers, &state.config.session_signing_key)
        .ok_or(AppError::Unauthorized)?;

    let user = state.ledger.fetch_or_create(&profile).await?;

    let mut flow = DeviceAuthFlow::new(params.callback);
    flow.observe_session(&SessionState::SignedIn(Box::new(user.clone())));

    let timestamp = chrono::Utc::now().timestamp_millis();
    let redirect_url = flow.authorize(&user, timestamp)?;

    tracing::info!(uid = %user.uid, "CLI authorization granted");

    Ok(Redirect::temporary(&redirect_url))
}

/// Deny: tell the CLI via its callback when one exists, otherwise
/// return to the landing page. Nothing is persisted.
async fn cli_auth_deny(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CliAuthParams>,
) -> Redirect {
    let mut flow = DeviceAuthFlow::new(params.callback);
    let target = flow.deny(&state.config.frontend_url);

    Redirect::temporary(&target)
}
