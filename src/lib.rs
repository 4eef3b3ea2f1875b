// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Credit-Hub: account and credit-ledger backend for the CLI.
//!
//! This crate provides the backend API behind the product website:
//! per-user credit balances consumed by the CLI, the beta-access
//! request intake, and the device-authorization handshake that hands
//! a signed-in web identity to a locally running CLI process.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{BetaIntake, CreditLedger};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub ledger: CreditLedger,
    pub beta: BetaIntake,
}
