// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credit ledger integration tests against the Firestore emulator.

use credit_hub::error::AppError;
use credit_hub::models::Plan;
use credit_hub::services::CreditLedger;

mod common;

fn unique_uid(prefix: &str) -> String {
    format!(
        "{}_{}",
        prefix,
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

#[tokio::test]
async fn test_fetch_or_create_defaults() {
    require_emulator!();

    let ledger = CreditLedger::new(common::test_db().await);
    let profile = common::test_profile(&unique_uid("create"));

    let user = ledger.fetch_or_create(&profile).await.unwrap();

    assert_eq!(user.credits, 5);
    assert_eq!(user.plan, Plan::Free);
    assert!(!user.beta_access);
    assert!(!user.beta_requested);
    assert!(user.purchases.is_empty());
    assert_eq!(user.created_at, user.last_login_at);
}

#[tokio::test]
async fn test_second_login_only_touches_last_login() {
    require_emulator!();

    let ledger = CreditLedger::new(common::test_db().await);
    let profile = common::test_profile(&unique_uid("relogin"));

    let first = ledger.fetch_or_create(&profile).await.unwrap();
    let second = ledger.fetch_or_create(&profile).await.unwrap();

    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.credits, 5);
    assert_eq!(second.plan, Plan::Free);
}

#[tokio::test]
async fn test_deduct_decrements_and_persists() {
    require_emulator!();

    let ledger = CreditLedger::new(common::test_db().await);
    let profile = common::test_profile(&unique_uid("deduct"));
    ledger.fetch_or_create(&profile).await.unwrap();

    let new_balance = ledger.deduct(&profile.uid).await.unwrap();
    assert_eq!(new_balance, 4);

    assert_eq!(ledger.get_balance(&profile.uid).await.unwrap(), 4);
}

#[tokio::test]
async fn test_deduct_at_zero_refused_and_balance_unchanged() {
    require_emulator!();

    let ledger = CreditLedger::new(common::test_db().await);
    let profile = common::test_profile(&unique_uid("drain"));
    ledger.fetch_or_create(&profile).await.unwrap();

    for expected in (0..5).rev() {
        assert_eq!(ledger.deduct(&profile.uid).await.unwrap(), expected);
    }

    let err = ledger.deduct(&profile.uid).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientCredits));
    assert_eq!(ledger.get_balance(&profile.uid).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_uid_is_not_found() {
    require_emulator!();

    let ledger = CreditLedger::new(common::test_db().await);
    let uid = unique_uid("missing");

    assert!(matches!(
        ledger.get_balance(&uid).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        ledger.deduct(&uid).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        ledger.sync(&uid).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_sync_returns_redacted_profile() {
    require_emulator!();

    let ledger = CreditLedger::new(common::test_db().await);
    let profile = common::test_profile(&unique_uid("sync"));
    ledger.fetch_or_create(&profile).await.unwrap();

    let view = ledger.sync(&profile.uid).await.unwrap();

    assert_eq!(view.uid, profile.uid);
    assert_eq!(view.credits, 5);
    assert_eq!(view.plan, Plan::Free);

    // The redacted view carries no purchase or beta fields at all
    let value = serde_json::to_value(&view).unwrap();
    let obj = value.as_object().unwrap();
    assert!(!obj.contains_key("purchases"));
    assert!(!obj.contains_key("betaAccess"));
}

#[tokio::test]
async fn test_concurrent_deducts_never_drive_balance_negative() {
    // With a balance of 1 and two racing deducts, the transactional
    // conditional decrement must let exactly one through and leave
    // the balance at 0.

    require_emulator!();

    let db = common::test_db().await;
    let ledger = CreditLedger::new(db);
    let profile = common::test_profile(&unique_uid("race"));
    ledger.fetch_or_create(&profile).await.unwrap();

    // Drain to a balance of 1
    for _ in 0..4 {
        ledger.deduct(&profile.uid).await.unwrap();
    }
    assert_eq!(ledger.get_balance(&profile.uid).await.unwrap(), 1);

    let mut handles = vec![];
    for _ in 0..2 {
        let ledger = ledger.clone();
        let uid = profile.uid.clone();
        handles.push(tokio::spawn(async move { ledger.deduct(&uid).await }));
    }

    let mut successes = 0;
    let mut refusals = 0;
    for handle in handles {
        match handle.await.expect("Task join failed") {
            Ok(new_balance) => {
                assert_eq!(new_balance, 0);
                successes += 1;
            }
            Err(AppError::InsufficientCredits) => refusals += 1,
            Err(other) => panic!("Unexpected deduct error: {:?}", other),
        }
    }

    assert_eq!(successes, 1, "Exactly one concurrent deduct may win");
    assert_eq!(refusals, 1);
    assert_eq!(ledger.get_balance(&profile.uid).await.unwrap(), 0);
}
