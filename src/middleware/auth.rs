// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session-token authentication middleware.
//!
//! The identity provider's session is carried as an HS256 JWT whose
//! claims mirror the provider profile. Handlers that only want to
//! know "is someone signed in" use [`extract_session`] directly.

use crate::models::IdentityProfile;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session cookie name set by the web frontend.
pub const SESSION_COOKIE: &str = "credithub_token";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity-provider uid)
    pub sub: String,
    /// Email address, when the provider shares it
    #[serde(default)]
    pub email: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Profile picture URL
    #[serde(default)]
    pub picture: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub profile: IdentityProfile,
}

/// Pull the bearer token from the session cookie or Authorization header.
fn bearer_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    auth_header.strip_prefix("Bearer ").map(str::to_string)
}

/// Verify a session token, returning the embedded identity profile.
pub fn verify_session_token(token: &str, signing_key: &[u8]) -> Option<IdentityProfile> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).ok()?;
    let claims = token_data.claims;

    Some(IdentityProfile {
        uid: claims.sub,
        email: claims.email,
        display_name: claims.name,
        photo_url: claims.picture,
    })
}

/// Observe the ambient session without failing the request.
/// Returns `None` for anonymous callers.
pub fn extract_session(
    jar: &CookieJar,
    headers: &HeaderMap,
    signing_key: &[u8],
) -> Option<IdentityProfile> {
    let token = bearer_token(jar, headers)?;
    verify_session_token(&token, signing_key)
}

/// Middleware that requires a valid session token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let profile = extract_session(
        &jar,
        request.headers(),
        &state.config.session_signing_key,
    )
    .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(AuthUser { profile });

    Ok(next.run(request).await)
}

/// Create a session token for an identity profile.
pub fn create_session_token(
    profile: &IdentityProfile,
    signing_key: &[u8],
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: profile.uid.clone(),
        email: profile.email.clone(),
        name: profile.display_name.clone(),
        picture: profile.photo_url.clone(),
        iat: now,
        exp: now + 30 * 24 * 60 * 60, // 30 days
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
