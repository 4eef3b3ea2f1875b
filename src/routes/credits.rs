// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CLI credit query endpoint.
//!
//! Consumed directly by the CLI (no session). Every outcome the CLI
//! can act on is an HTTP 200 result object with a `success` flag;
//! only backend failures surface as 5xx.

use crate::error::{AppError, Result};
use crate::services::SyncProfile;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/credits", get(handle_credits))
}

#[derive(Deserialize)]
struct CreditsQuery {
    uid: Option<String>,
    action: Option<String>,
    // token param reserved for future auth
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreditAction {
    Get,
    Deduct,
    Sync,
}

impl CreditAction {
    /// Parse the `action` parameter; omitted means `get`.
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.unwrap_or("get") {
            "get" => Some(CreditAction::Get),
            "deduct" => Some(CreditAction::Deduct),
            "sync" => Some(CreditAction::Sync),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct BalanceResponse {
    success: bool,
    credits: u32,
}

#[derive(Serialize)]
struct DeductResponse {
    success: bool,
    credits: u32,
    deducted: u32,
}

#[derive(Serialize)]
struct SyncResponse {
    success: bool,
    #[serde(flatten)]
    profile: SyncProfile,
}

#[derive(Serialize)]
struct FailureResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    credits: Option<u32>,
    error: String,
}

fn failure(credits: Option<u32>, error: &str) -> Response {
    Json(FailureResponse {
        success: false,
        credits,
        error: error.to_string(),
    })
    .into_response()
}

/// Handle a CLI credit request, parameterized by `uid` and `action`.
async fn handle_credits(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CreditsQuery>,
) -> Result<Response> {
    // Empty query values count as absent, like the web form they
    // originate from
    let Some(uid) = params.uid.as_deref().filter(|u| !u.is_empty()) else {
        return Ok(failure(None, "Missing uid parameter"));
    };

    let action = params.action.as_deref().filter(|a| !a.is_empty());
    let Some(action) = CreditAction::parse(action) else {
        return Ok(failure(None, "Invalid action"));
    };

    tracing::debug!(uid, action = ?action, "CLI credit request");

    match action {
        CreditAction::Get => match state.ledger.get_balance(uid).await {
            Ok(credits) => Ok(Json(BalanceResponse {
                success: true,
                credits,
            })
            .into_response()),
            Err(AppError::NotFound(_)) => Ok(failure(None, "User not found")),
            Err(e) => Err(e),
        },

        CreditAction::Deduct => match state.ledger.deduct(uid).await {
            Ok(credits) => Ok(Json(DeductResponse {
                success: true,
                credits,
                deducted: 1,
            })
            .into_response()),
            Err(AppError::InsufficientCredits) => {
                Ok(failure(Some(0), "No credits remaining"))
            }
            Err(AppError::NotFound(_)) => Ok(failure(None, "User not found")),
            Err(e) => Err(e),
        },

        CreditAction::Sync => match state.ledger.sync(uid).await {
            Ok(profile) => Ok(Json(SyncResponse {
                success: true,
                profile,
            })
            .into_response()),
            Err(AppError::NotFound(_)) => Ok(failure(None, "User not found")),
            Err(e) => Err(e),
        },
    }
}
