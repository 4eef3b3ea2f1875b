// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use credit_hub::config::Config;
use credit_hub::db::FirestoreDb;
use credit_hub::middleware::auth::create_session_token;
use credit_hub::models::IdentityProfile;
use credit_hub::routes::create_router;
use credit_hub::services::{BetaIntake, CreditLedger};
use credit_hub::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Identity profile as the provider would report it.
#[allow(dead_code)]
pub fn test_profile(uid: &str) -> IdentityProfile {
    IdentityProfile {
        uid: uid.to_string(),
        email: Some(format!("{}@example.com", uid)),
        display_name: Some("Test User".to_string()),
        photo_url: None,
    }
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let ledger = CreditLedger::new(db.clone());
    let beta = BetaIntake::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        ledger,
        beta,
    });

    (create_router(state.clone()), state)
}

/// Create a session token for a test user.
#[allow(dead_code)]
pub fn create_test_token(uid: &str, signing_key: &[u8]) -> String {
    create_session_token(&test_profile(uid), signing_key).expect("Failed to create session token")
}
