// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Beta access request intake.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::beta::ANONYMOUS_KEY_PREFIX;
use crate::models::{BetaRequest, BetaRequestForm};

/// Records beta access requests and flags the requesting user.
#[derive(Clone)]
pub struct BetaIntake {
    db: FirestoreDb,
}

impl BetaIntake {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Submit a beta request, returning the stored document key.
    ///
    /// Validates required fields before any write. Authenticated
    /// submissions also merge-upsert `betaRequested` onto the user
    /// record; that flag is advisory UI state, so a failure of the
    /// second write is logged and tolerated rather than rolled back.
    pub async fn submit(
        &self,
        form: BetaRequestForm,
        uid: Option<&str>,
    ) -> Result<String, AppError> {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::Validation(missing));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let key = request_key(uid, chrono::Utc::now().timestamp_millis());

        let request = BetaRequest::from_form(form, uid, &now);
        self.db.set_beta_request(&key, &request).await?;

        tracing::info!(key = %key, authenticated = uid.is_some(), "Beta request recorded");

        if let Some(uid) = uid {
            if let Err(e) = self.db.mark_beta_requested(uid, &now).await {
                tracing::warn!(uid, error = %e, "Failed to update betaRequested flag");
            }
        }

        Ok(key)
    }
}

/// Document key for a submission: `{uid}_{millis}` when authenticated,
/// else the anonymous sentinel prefix plus the timestamp. Every
/// submission gets its own record.
fn request_key(uid: Option<&str>, unix_millis: i64) -> String {
    match uid {
        Some(uid) => format!("{}_{}", uid, unix_millis),
        None => format!("{}{}", ANONYMOUS_KEY_PREFIX, unix_millis),
    }
}
