// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod beta;
pub mod device_auth;
pub mod ledger;

pub use beta::BetaIntake;
pub use device_auth::{AuthorizationBundle, DeviceAuthFlow, FlowState, SessionState};
pub use ledger::{CreditLedger, SyncProfile};
