// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CLI device-authorization handshake.
//!
//! A short-lived flow binding an authenticated web session to a
//! waiting CLI process. The CLI opens the authorization page with a
//! `callback` parameter pointing at its local listener; on approval
//! the browser is redirected to `{callback}?data=<token>` where the
//! token is a reversibly encoded profile snapshot. The token is a
//! transport convenience, not a live credential: the CLI re-syncs
//! state through the credits API afterwards.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Plan, User};

/// Point-in-time profile snapshot handed to the CLI via redirect.
/// Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationBundle {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub credits: u32,
    pub plan: Plan,
    /// Wall-clock unix millis at authorization time; the CLI uses
    /// this to enforce freshness
    pub timestamp: i64,
}

impl AuthorizationBundle {
    /// Snapshot the user record at authorization time.
    pub fn from_user(user: &User, timestamp: i64) -> Self {
        Self {
            id: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            credits: user.credits,
            plan: user.plan,
            timestamp,
        }
    }

    /// Encode as a single token: base64 over compact JSON.
    /// The CLI reverses this without any shared secret.
    pub fn encode(&self) -> Result<String, AppError> {
        let json = serde_json::to_string(self)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Bundle encoding failed: {}", e)))?;
        Ok(STANDARD.encode(json))
    }

    /// Reverse of [`AuthorizationBundle::encode`].
    pub fn decode(token: &str) -> Result<Self, AppError> {
        let bytes = STANDARD
            .decode(token)
            .map_err(|_| AppError::BadRequest("Invalid bundle token".to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|_| AppError::BadRequest("Invalid bundle token".to_string()))
    }
}

/// Ambient session as observed by the flow.
///
/// Starts `Unknown` until the identity layer's first event arrives;
/// the flow stays in `Loading` until the observation settles.
#[derive(Debug, Clone)]
pub enum SessionState {
    Unknown,
    SignedOut,
    SignedIn(Box<User>),
}

/// Flow states. `Success` and `Error` are terminal per instance;
/// recovery means starting a fresh flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Loading,
    AwaitingConsent,
    RedirectingToLogin,
    Success,
    Error,
}

/// Single-use device-authorization flow instance.
#[derive(Debug)]
pub struct DeviceAuthFlow {
    callback: Option<String>,
    state: FlowState,
}

impl DeviceAuthFlow {
    /// Start a flow for the given `callback` parameter (the CLI's
    /// local listener URL), if one was supplied.
    pub fn new(callback: Option<String>) -> Self {
        Self {
            callback,
            state: FlowState::Loading,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn callback(&self) -> Option<&str> {
        self.callback.as_deref()
    }

    /// Feed a session observation into the flow.
    ///
    /// Only a `Loading` flow transitions; `Unknown` observations keep
    /// it there until the session check settles.
    pub fn observe_session(&mut self, session: &SessionState) {
        if self.state != FlowState::Loading {
            return;
        }

        match session {
            SessionState::Unknown => {}
            SessionState::SignedOut => self.state = FlowState::RedirectingToLogin,
            SessionState::SignedIn(_) => self.state = FlowState::AwaitingConsent,
        }
    }

    /// Login redirect target, available once the session settled as
    /// signed-out. `request_url` (the full authorization URL including
    /// `callback`) rides along so the flow can resume post-login.
    pub fn login_redirect(&self, request_url: &str, frontend_url: &str) -> Option<String> {
        (self.state == FlowState::RedirectingToLogin).then(|| {
            format!(
                "{}/login?redirect={}",
                frontend_url,
                urlencoding::encode(request_url)
            )
        })
    }

    /// Approve the authorization, returning the callback redirect URL.
    ///
    /// One-shot: once the flow leaves `AwaitingConsent` the token is
    /// not re-issuable; a new authorization requires a fresh flow.
    /// Fails with `InvalidCallback` (moving to `Error`, no navigation)
    /// when no callback was supplied.
    pub fn authorize(&mut self, user: &User, timestamp: i64) -> Result<String, AppError> {
        if self.state != FlowState::AwaitingConsent {
            return Err(AppError::BadRequest(
                "Authorization flow already settled".to_string(),
            ));
        }

        let Some(callback) = self.callback.as_deref() else {
            self.state = FlowState::Error;
            return Err(AppError::InvalidCallback);
        };

        let bundle = AuthorizationBundle::from_user(user, timestamp);
        let token = bundle.encode()?;

        self.state = FlowState::Success;
        Ok(format!("{}?data={}", callback, urlencoding::encode(&token)))
    }

    /// Decline the authorization. Nothing is persisted; the CLI is
    /// told via the callback when one exists, otherwise the browser
    /// returns to the landing page.
    pub fn deny(&mut self, frontend_url: &str) -> String {
        self.state = FlowState::Error;

        match self.callback.as_deref() {
            Some(callback) => format!("{}?error=denied", callback),
            None => format!("{}/", frontend_url),
        }
    }
}
