// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credit ledger operations keyed by identity-provider uid.
//!
//! The ledger never caches balances: every call re-reads the record
//! store, so staleness is bounded by round-trip latency only.

use serde::{Deserialize, Serialize};

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{IdentityProfile, Plan, User};

/// Credit ledger backed by the user record store.
#[derive(Clone)]
pub struct CreditLedger {
    db: FirestoreDb,
}

/// Redacted profile view returned by `sync`.
/// No purchase history, no beta fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub credits: u32,
    pub plan: Plan,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl CreditLedger {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Fetch the user record, creating it on first sign-in.
    ///
    /// Existing records only get `lastLoginAt` refreshed; credits,
    /// plan, purchases, and beta fields are never overwritten here.
    pub async fn fetch_or_create(&self, profile: &IdentityProfile) -> Result<User, AppError> {
        let now = chrono::Utc::now().to_rfc3339();

        match self.db.get_user(&profile.uid).await? {
            Some(mut user) => {
                user.last_login_at = now;
                self.db.touch_last_login(&user).await?;
                Ok(user)
            }
            None => {
                let user = User::new_account(profile, &now);
                self.db.create_user(&user).await?;

                tracing::info!(uid = %user.uid, "Created user account");
                Ok(user)
            }
        }
    }

    /// Get the current credit balance.
    pub async fn get_balance(&self, uid: &str) -> Result<u32, AppError> {
        let user = self
            .db
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))?;

        Ok(user.credits)
    }

    /// Deduct exactly one credit, returning the new balance.
    ///
    /// Fails with `InsufficientCredits` (and performs no write) once
    /// the balance reaches 0. The conditional decrement runs inside a
    /// store transaction, so the balance can never go negative under
    /// concurrent callers.
    pub async fn deduct(&self, uid: &str) -> Result<u32, AppError> {
        self.db.deduct_credit(uid).await
    }

    /// Read-only redacted profile view for the CLI.
    pub async fn sync(&self, uid: &str) -> Result<SyncProfile, AppError> {
        let user = self
            .db
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))?;

        Ok(SyncProfile {
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            credits: user.credits,
            plan: user.plan,
            photo_url: user.photo_url,
        })
    }
}
