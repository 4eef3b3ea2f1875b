// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile + credit balance)
//! - Beta requests (access request intake)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{BetaRequest, User};
use firestore::paths_camel_case;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Result of the conditional decrement, resolved inside the
/// transaction closure and mapped to errors by the caller.
enum DeductOutcome {
    NotFound,
    Insufficient,
    Deducted(u32),
}

/// Partial document for the beta-flag merge write.
/// Only the fields named in the update mask reach the store.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BetaFlagUpdate {
    beta_requested: bool,
    beta_requested_at: String,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// Set FIRESTORE_EMULATOR_HOST to target a local emulator instead
    /// of the live project.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator wants an unauthenticated connection; don't pick
        // up ambient credentials when it is in use.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Backend(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Firestore emulator host set, connecting unauthenticated");

        // The emulator accepts any bearer token; an ExternalJwtFunctionSource
        // hands it a static one without a custom TokenSource impl.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// Every operation fails with a backend error; router tests use
    /// this to exercise handlers without a store.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Backend("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their identity-provider uid.
    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Backend(e.to_string()))
    }

    /// Create a user record (full-document write).
    ///
    /// Concurrent first logins may race here; both writers produce
    /// equivalent default records, so last write wins.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Ok(())
    }

    /// Refresh only `lastLoginAt` on an existing record.
    ///
    /// Field-masked write: credits, plan, purchases, and beta fields
    /// are never touched by the login path.
    pub async fn touch_last_login(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths_camel_case!(User::{last_login_at}))
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Ok(())
    }

    /// Conditionally decrement a user's credit balance by 1.
    ///
    /// The read and the write run inside a Firestore transaction, so
    /// concurrent callers serialize through the store: the balance is
    /// re-read on conflict retry and the decrement is refused at 0.
    /// Returns the new balance.
    pub async fn deduct_credit(&self, uid: &str) -> Result<u32, AppError> {
        let uid = uid.to_string();

        let outcome: DeductOutcome = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let uid = uid.clone();
                async move {
                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&uid)
                        .await?;

                    let Some(mut user) = user else {
                        return Ok(DeductOutcome::NotFound);
                    };

                    if user.credits == 0 {
                        return Ok(DeductOutcome::Insufficient);
                    }

                    user.credits -= 1;
                    db.fluent()
                        .update()
                        .fields(paths_camel_case!(User::{credits}))
                        .in_col(collections::USERS)
                        .document_id(&user.uid)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    Ok(DeductOutcome::Deducted(user.credits))
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Backend(format!("Deduct transaction failed: {}", e)))?;

        match outcome {
            DeductOutcome::NotFound => {
                Err(AppError::NotFound(format!("User {} not found", uid)))
            }
            DeductOutcome::Insufficient => Err(AppError::InsufficientCredits),
            DeductOutcome::Deducted(new_balance) => {
                tracing::debug!(uid = %uid, new_balance, "Credit deducted");
                Ok(new_balance)
            }
        }
    }

    // ─── Beta Request Operations ─────────────────────────────────

    /// Store a beta request document.
    pub async fn set_beta_request(
        &self,
        key: &str,
        request: &BetaRequest,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::BETA_REQUESTS)
            .document_id(key)
            .object(request)
            .execute()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Ok(())
    }

    /// Get a beta request by document key.
    pub async fn get_beta_request(&self, key: &str) -> Result<Option<BetaRequest>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::BETA_REQUESTS)
            .obj()
            .one(key)
            .await
            .map_err(|e| AppError::Backend(e.to_string()))
    }

    /// Merge-upsert `betaRequested` / `betaRequestedAt` onto a user record.
    ///
    /// Fields outside the update mask are left untouched.
    pub async fn mark_beta_requested(&self, uid: &str, now: &str) -> Result<(), AppError> {
        let update = BetaFlagUpdate {
            beta_requested: true,
            beta_requested_at: now.to_string(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths_camel_case!(BetaFlagUpdate::{beta_requested, beta_requested_at}))
            .in_col(collections::USERS)
            .document_id(uid)
            .object(&update)
            .execute()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;
        Ok(())
    }
}
