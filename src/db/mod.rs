//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Beta access requests (keyed by uid or generated anonymous key)
    pub const BETA_REQUESTS: &str = "betaRequests";
}
